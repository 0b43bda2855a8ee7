// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Fetchers against local mock HTTP servers.

use chrono::{Duration, Utc};
use rivalscope_config::SourcesConfig;
use rivalscope_sources::{Sentiment, SourceClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SourceClient {
    let cfg = SourcesConfig {
        greenhouse_base_url: server.uri(),
        github_api_url: server.uri(),
        news_rss_url: format!("{}/rss/search", server.uri()),
        patents_base_url: server.uri(),
        ..Default::default()
    };
    SourceClient::with_github_token(&cfg, None).unwrap()
}

// ── Jobs ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn jobs_keep_recent_and_skip_unparsable() {
    let server = MockServer::start().await;
    let recent = (Utc::now() - Duration::days(2)).to_rfc3339();
    let old = (Utc::now() - Duration::days(45)).to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/v1/boards/anthropic/jobs"))
        .and(query_param("content", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [
                { "id": 1, "title": "Research Engineer", "updated_at": recent,
                  "location": { "name": "San Francisco" },
                  "departments": [{ "name": "Research" }],
                  "absolute_url": "https://boards.example/1", "content": "  Build things.  " },
                { "id": 2, "title": "Old Role", "updated_at": old },
                { "id": 3, "title": "Broken", "updated_at": "sometime last week" }
            ]
        })))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_jobs("Anthropic").await.unwrap();
    assert_eq!(outcome.count(), 1);
    let job = &outcome.records[0];
    assert_eq!(job.job_id, "1");
    assert_eq!(job.department, "Research");
    assert_eq!(job.description, "Build things.");
    assert_eq!(outcome.resolved.as_deref(), Some("anthropic"));
}

#[tokio::test]
async fn jobs_404_is_empty_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/openai/jobs"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_jobs("OpenAI").await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.summary, "OpenAI does not have a public Greenhouse job board");
}

#[tokio::test]
async fn jobs_for_unresolvable_company_are_empty() {
    let server = MockServer::start().await;
    let outcome = client(&server).fetch_jobs("Nobody Corp").await.unwrap();
    assert!(outcome.is_empty());
    assert!(outcome.summary.contains("does not have a public Greenhouse job board"));
}

#[tokio::test]
async fn jobs_server_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/google/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).fetch_jobs("Google").await.unwrap_err();
    assert!(err.is_upstream());
}

// ── News ──────────────────────────────────────────────────────────────────────

fn rss(items: &[(&str, &str, String)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, date)| {
            format!(
                "<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate>\
                 <description>&lt;b&gt;{title}&lt;/b&gt;</description></item>"
            )
        })
        .collect();
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>q</title>{body}</channel></rss>"#)
}

#[tokio::test]
async fn news_filters_by_window_and_scores_sentiment() {
    let server = MockServer::start().await;
    let fresh = (Utc::now() - Duration::days(1)).to_rfc2822();
    let stale = (Utc::now() - Duration::days(20)).to_rfc2822();
    let xml = rss(&[
        ("Acme launches breakthrough model - Wire", "https://e.com/1", fresh),
        ("Acme old news - Wire", "https://e.com/2", stale),
        ("Acme undated - Wire", "https://e.com/3", "not a date".into()),
    ]);
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .and(query_param("q", "Acme"))
        .and(query_param("ceid", "US:en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_news("Acme", 7).await.unwrap();
    assert_eq!(outcome.count(), 1);
    let article = &outcome.records[0];
    assert_eq!(article.source, "Wire");
    assert_eq!(article.sentiment, Sentiment::Positive);
    assert_eq!(article.snippet, "Acme launches breakthrough model - Wire");
    assert_eq!(outcome.summary, "Found 1 recent articles about Acme");
}

#[tokio::test]
async fn news_out_of_range_window_is_clamped() {
    let server = MockServer::start().await;
    let xml = rss(&[
        ("Acme last year - Wire", "https://e.com/1", (Utc::now() - Duration::days(300)).to_rfc2822()),
        ("Acme long ago - Wire", "https://e.com/2", (Utc::now() - Duration::days(4000)).to_rfc2822()),
    ]);
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    let c = client(&server);
    let outcome = c.fetch_news("Acme", 1_000_000_000_000).await.unwrap();
    assert_eq!(outcome.count(), 1);
    assert_eq!(outcome.records[0].url, "https://e.com/1");

    let outcome = c.fetch_news("Acme", -5).await.unwrap();
    assert!(outcome.is_empty());
}

#[tokio::test]
async fn news_description_entities_are_decoded() {
    let server = MockServer::start().await;
    let xml = format!(
        "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><item><title>Deal - Wire</title>\
         <link>https://e.com/d</link><pubDate>{}</pubDate>\
         <description>&lt;a href=\"x\"&gt;AT&amp;amp;T &amp;#39;wins&amp;#39; deal&lt;/a&gt;</description>\
         </item></channel></rss>",
        Utc::now().to_rfc2822()
    );
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_news("Acme", 7).await.unwrap();
    assert_eq!(outcome.records[0].snippet, "AT&T 'wins' deal");
}

// ── GitHub ────────────────────────────────────────────────────────────────────

fn repo_page(prefix: &str, n: usize, stars: u64) -> Value {
    let now = Utc::now().to_rfc3339();
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "name": format!("{prefix}{i}"),
                    "full_name": format!("openai/{prefix}{i}"),
                    "description": "repo",
                    "stargazers_count": stars,
                    "forks_count": 1,
                    "watchers_count": stars,
                    "language": "Python",
                    "topics": ["ml"],
                    "created_at": now,
                    "updated_at": now,
                    "html_url": format!("https://github.com/openai/{prefix}{i}")
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn github_pagination_stops_at_page_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/openai/repos"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_page("r", 100, 1)))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_github("OpenAI").await.unwrap();
    assert_eq!(outcome.count(), 300);
    assert_eq!(outcome.resolved.as_deref(), Some("openai"));
}

#[tokio::test]
async fn github_fetches_readme_only_for_popular_repos() {
    let server = MockServer::start().await;
    let mut repos = repo_page("small", 1, 5);
    if let (Value::Array(all), Value::Array(big)) = (&mut repos, repo_page("big", 1, 500)) {
        all.extend(big);
    }
    Mock::given(method("GET"))
        .and(path("/orgs/openai/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/openai/big0/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": "IyBCaWcK\n", "encoding": "base64"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_github("openai").await.unwrap();
    assert_eq!(outcome.count(), 2);
    let big = outcome.records.iter().find(|r| r.name == "big0").unwrap();
    assert_eq!(big.readme, "# Big\n");
    let small = outcome.records.iter().find(|r| r.name == "small0").unwrap();
    assert_eq!(small.readme, "");
}

#[tokio::test]
async fn github_unresolved_org_is_empty() {
    let server = MockServer::start().await;
    let outcome = client(&server).fetch_github("Zzz Unknown").await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.summary, "Could not find GitHub organization for \"Zzz Unknown\"");
}

// ── Patents ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patents_respect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xhr/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "cluster": [
                { "result": [
                    { "id": "patent/US1/en", "patent": { "title": "First" } },
                    { "id": "patent/US2/en", "patent": { "title": "" } },
                    { "id": "patent/US3/en", "patent": { "title": "Third" } },
                    { "id": "patent/US4/en", "patent": { "title": "Fourth" } }
                ]}
            ]}
        })))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_patents("Anthropic", 2).await.unwrap();
    let numbers: Vec<&str> = outcome.records.iter().map(|p| p.patent_number.as_str()).collect();
    assert_eq!(numbers, vec!["US1", "US3"]);
    assert!(outcome.summary.starts_with("Found 2 patents for Anthropic"));
}

#[tokio::test]
async fn patents_non_200_is_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xhr/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).fetch_patents("Anthropic", 10).await.unwrap_err();
    assert!(err.is_upstream());
    assert_eq!(err.kind(), "UpstreamStatus");
}
