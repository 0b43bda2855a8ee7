// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Endpoint tests against mock upstreams, driven through the router
//! without binding a socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use rivalscope_config::{SourcesConfig, ToolsConfig};
use rivalscope_server::{router, AppState};
use rivalscope_sources::SourceClient;
use rivalscope_store::{Collection, DocumentStore, Filter, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: &MockServer, store: Arc<MemoryStore>) -> Router {
    let cfg = SourcesConfig {
        greenhouse_base_url: server.uri(),
        github_api_url: server.uri(),
        news_rss_url: format!("{}/rss/search", server.uri()),
        patents_base_url: server.uri(),
        companies: vec!["openai".into(), "anthropic".into()],
        ..Default::default()
    };
    let state = AppState {
        sources: SourceClient::with_github_token(&cfg, None).unwrap(),
        store,
        tools: ToolsConfig::default(),
        body_limit: 64 * 1024,
    };
    router(Arc::new(state))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let server = MockServer::start().await;
    let resp = app(&server, Arc::new(MemoryStore::new()))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn preflight_answers_204_with_cors_headers() {
    let server = MockServer::start().await;
    let req = Request::builder().method(Method::OPTIONS).uri("/news").body(Body::empty()).unwrap();
    let resp = app(&server, Arc::new(MemoryStore::new())).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let h = resp.headers();
    assert_eq!(h["access-control-allow-origin"], "*");
    assert_eq!(h["access-control-allow-methods"], "POST");
    assert_eq!(h["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn jobs_for_all_companies_reports_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/openai/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [
                { "id": 7, "title": "Research Engineer", "updated_at": Utc::now().to_rfc3339(),
                  "departments": [{"name": "Research"}], "location": {"name": "SF"} }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/anthropic/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let resp = app(&server, store.clone()).oneshot(post("/jobs", json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_jobs"], 1);
    assert_eq!(body["companies"]["openai"]["job_count"], 1);
    assert_eq!(body["companies"]["openai"]["recent_jobs"][0]["department"], "Research");
    assert_eq!(body["companies"]["anthropic"]["job_count"], 0);
    assert!(body["companies"]["anthropic"]["error"].as_str().unwrap().contains("503"));

    let stored = store.query(Collection::Jobs, &Filter::company("openai")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["job_id"], "7");
}

#[tokio::test]
async fn github_unresolved_org_is_not_an_error() {
    let server = MockServer::start().await;
    let resp = app(&server, Arc::new(MemoryStore::new()))
        .oneshot(post("/github", json!({"company": "Nobody Inc"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["total_repos"], 0);
    assert_eq!(body["message"], "Could not find GitHub organization for \"Nobody Inc\"");
}

#[tokio::test]
async fn github_reports_activity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/openai/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "gym", "stargazers_count": 30, "forks_count": 3,
              "updated_at": Utc::now().to_rfc3339() },
            { "name": "old", "stargazers_count": 5, "forks_count": 1,
              "updated_at": "2019-01-01T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let resp = app(&server, Arc::new(MemoryStore::new()))
        .oneshot(post("/github", json!({"company": "OpenAI"})))
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["organization"], "openai");
    assert_eq!(body["total_repos"], 2);
    assert_eq!(body["total_stars"], 35);
    assert_eq!(body["active_last_30d"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn upstream_failure_is_502() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xhr/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resp = app(&server, Arc::new(MemoryStore::new()))
        .oneshot(post("/patents", json!({"company": "Anthropic", "limit": 5})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "UpstreamStatus");
}

#[tokio::test]
async fn news_defaults_and_persists() {
    let server = MockServer::start().await;
    let now = Utc::now().to_rfc2822();
    let rss = format!(
        "<?xml version=\"1.0\"?><rss><channel>\
         <item><title>Anthropic launches model - Wire</title><link>https://e.com/a</link>\
         <pubDate>{now}</pubDate><description>launch</description><source url=\"https://wire\">Wire</source></item>\
         </channel></rss>"
    );
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let req = Request::builder().method(Method::POST).uri("/news").body(Body::from("garbage")).unwrap();
    let resp = app(&server, store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["query"], "Anthropic");
    assert_eq!(body["article_count"], 1);
    assert_eq!(body["articles"][0]["source"], "Wire");

    let stored = store.query(Collection::News, &Filter::company("Anthropic")).await.unwrap();
    assert_eq!(stored.len(), 1);
}
