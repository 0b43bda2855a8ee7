// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rivalscope_sources::github::top_by_stars;
use rivalscope_sources::{JobInsights, NewsInsights, RepoActivity};
use rivalscope_store::persist_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::{AppState, ServerError};

/// Number of articles echoed back by the news endpoint; all are stored.
const NEWS_RESPONSE_LIMIT: usize = 20;

/// Optional JSON body shared by all endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FetchRequest {
    company: Option<String>,
    days_back: Option<i64>,
    limit: Option<usize>,
}

impl FetchRequest {
    /// A missing or unparsable body means "use the defaults".
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn company_or(&self, default: &str) -> String {
        match self.company.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => default.to_string(),
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(ACCESS_CONTROL_ALLOW_METHODS, "POST"), (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")],
    )
}

pub(crate) async fn jobs(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ServerError> {
    let req = FetchRequest::parse(&body);
    let companies: Vec<String> = match req.company.as_deref().map(str::trim) {
        None | Some("") | Some("all") => state.cfg().companies.clone(),
        Some(c) => vec![c.to_string()],
    };

    let mut total_jobs = 0;
    let mut by_company = Map::new();
    for company in companies {
        info!(%company, "scraping jobs");
        let entry = match state.sources.fetch_jobs(&company).await {
            Ok(outcome) if outcome.resolved.is_none() => json!({
                "job_count": 0,
                "message": outcome.summary,
                "recent_jobs": [],
            }),
            Ok(outcome) => {
                persist_all(state.store.as_ref(), &company, &outcome.records).await;
                let insights =
                    JobInsights::from_jobs(&company, &outcome.records, state.cfg().job_window_days);
                total_jobs += outcome.records.len();
                json!({
                    "company": company,
                    "job_count": outcome.records.len(),
                    "recent_jobs": outcome.records,
                    "insights": insights,
                })
            }
            Err(e) => {
                error!(%company, error = %e, "job fetch failed");
                json!({ "error": e.to_string(), "job_count": 0 })
            }
        };
        by_company.insert(company, entry);
    }

    Ok(Json(json!({
        "success": true,
        "total_jobs": total_jobs,
        "companies": by_company,
        "timestamp": timestamp(),
    })))
}

pub(crate) async fn news(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ServerError> {
    let req = FetchRequest::parse(&body);
    let company = req.company_or(&state.cfg().default_company);
    let days_back = req.days_back.unwrap_or(state.cfg().news_days_back);

    info!(%company, days_back, "searching news");
    let outcome = state.sources.fetch_news(&company, days_back).await.map_err(|e| {
        error!(%company, error = %e, "news fetch failed");
        e
    })?;
    persist_all(state.store.as_ref(), &company, &outcome.records).await;
    let insights = NewsInsights::from_articles(&company, &outcome.records);

    let shown = &outcome.records[..outcome.records.len().min(NEWS_RESPONSE_LIMIT)];
    Ok(Json(json!({
        "success": true,
        "query": company,
        "article_count": outcome.records.len(),
        "articles": shown,
        "insights": insights,
        "timestamp": timestamp(),
    })))
}

pub(crate) async fn github(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ServerError> {
    let req = FetchRequest::parse(&body);
    let company = req.company_or(&state.cfg().default_company);

    info!(%company, "fetching GitHub data");
    let outcome = state.sources.fetch_github(&company).await.map_err(|e| {
        error!(%company, error = %e, "GitHub fetch failed");
        e
    })?;

    let Some(organization) = outcome.resolved.clone() else {
        return Ok(Json(json!({
            "success": false,
            "company": company,
            "message": outcome.summary,
            "total_repos": 0,
            "total_stars": 0,
        })));
    };

    let top = top_by_stars(&outcome.records, state.cfg().stored_repo_limit);
    persist_all(state.store.as_ref(), &company, &top).await;

    let activity = RepoActivity::from_repos(&outcome.records, Utc::now(), state.cfg().repo_window_days);
    let mut resp = match serde_json::to_value(&activity) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    resp.insert("success".into(), json!(true));
    resp.insert("company".into(), json!(company));
    resp.insert("organization".into(), json!(organization));
    resp.insert("timestamp".into(), json!(timestamp()));
    Ok(Json(Value::Object(resp)))
}

pub(crate) async fn patents(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ServerError> {
    let req = FetchRequest::parse(&body);
    let company = req.company_or(&state.cfg().default_company);
    let max = state.tools.max_patent_limit.max(1) as usize;
    let limit = req.limit.unwrap_or(state.tools.default_patent_limit as usize).clamp(1, max);

    info!(%company, limit, "searching patents");
    let outcome = state.sources.fetch_patents(&company, limit).await.map_err(|e| {
        error!(%company, error = %e, "patent search failed");
        e
    })?;
    persist_all(state.store.as_ref(), &company, &outcome.records).await;

    Ok(Json(json!({
        "success": true,
        "company": company,
        "count": outcome.records.len(),
        "summary": outcome.summary,
        "patents": outcome.records,
        "timestamp": timestamp(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_body_uses_defaults() {
        let req = FetchRequest::parse(b"not json");
        assert!(req.company.is_none());
        assert_eq!(req.company_or("Anthropic"), "Anthropic");
        assert!(FetchRequest::parse(b"").days_back.is_none());
    }

    #[test]
    fn body_fields_are_read() {
        let req = FetchRequest::parse(br#"{"company": " OpenAI ", "days_back": 3, "limit": 5}"#);
        assert_eq!(req.company_or("Anthropic"), "OpenAI");
        assert_eq!(req.days_back, Some(3));
        assert_eq!(req.limit, Some(5));
    }
}
