// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HTTP endpoints, one per fetcher.
//!
//! Every endpoint accepts `POST` with an optional JSON body
//! `{company, days_back, limit}` and answers `OPTIONS` preflights with 204.
//! All responses carry `Access-Control-Allow-Origin: *`.

mod error;
mod handlers;

use std::sync::Arc;

use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use rivalscope_config::{SourcesConfig, ToolsConfig};
use rivalscope_sources::SourceClient;
use rivalscope_store::DocumentStore;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ServerError;

/// Shared read-only state handed to every handler.
pub struct AppState {
    pub sources: SourceClient,
    pub store: Arc<dyn DocumentStore>,
    pub tools: ToolsConfig,
    pub body_limit: usize,
}

impl AppState {
    pub(crate) fn cfg(&self) -> &SourcesConfig {
        self.sources.config()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/patents", post(handlers::patents).options(handlers::preflight))
        .route("/jobs", post(handlers::jobs).options(handlers::preflight))
        .route("/news", post(handlers::news).options(handlers::preflight))
        .route("/github", post(handlers::github).options(handlers::preflight))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, "HTTP endpoints listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
