// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use rivalscope_config::SourcesConfig;
use tracing::debug;

use crate::{resolve, SourceError};

/// Shared HTTP plumbing for every fetcher.
///
/// Holds two clients: one for list/search calls and one with a shorter
/// timeout for existence probes.
#[derive(Clone)]
pub struct SourceClient {
    pub(crate) http: reqwest::Client,
    probe: reqwest::Client,
    pub(crate) cfg: SourcesConfig,
    github_token: Option<String>,
}

impl SourceClient {
    /// Build a client; the GitHub token is read from the environment
    /// variable named by `cfg.github_token_env`.
    pub fn new(cfg: &SourcesConfig) -> Result<Self, SourceError> {
        let token = std::env::var(&cfg.github_token_env).ok().filter(|t| !t.is_empty());
        Self::with_github_token(cfg, token)
    }

    pub fn with_github_token(
        cfg: &SourcesConfig,
        github_token: Option<String>,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let probe = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.probe_timeout_secs))
            .build()?;
        Ok(Self { http, probe, cfg: cfg.clone(), github_token })
    }

    pub fn config(&self) -> &SourcesConfig {
        &self.cfg
    }

    pub(crate) fn github_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
        if let Some(token) = &self.github_token {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        headers
    }

    /// `true` iff `url` answers 200.  Transport errors count as "not found".
    async fn exists(&self, url: &str, headers: HeaderMap) -> bool {
        match self.probe.get(url).headers(headers).send().await {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                debug!(%url, error = %e, "probe failed");
                false
            }
        }
    }

    /// Try each spelling variation in order and return the first the source
    /// confirms.
    async fn probe_variations(
        &self,
        name: &str,
        url_for: impl Fn(&str) -> String,
        headers: impl Fn() -> HeaderMap,
    ) -> Option<String> {
        for candidate in resolve::variations(name) {
            if self.exists(&url_for(&candidate), headers()).await {
                debug!(%name, %candidate, "name resolved by probe");
                return Some(candidate);
            }
        }
        None
    }

    pub async fn resolve_github_org(&self, company: &str) -> Option<String> {
        if let Some(alias) = resolve::github_alias(company) {
            return Some(alias.to_string());
        }
        let base = self.cfg.github_api_url.trim_end_matches('/').to_string();
        self.probe_variations(company, |v| format!("{base}/orgs/{v}"), || self.github_headers())
            .await
    }

    pub async fn resolve_greenhouse_board(&self, company: &str) -> Option<String> {
        if let Some(alias) = resolve::greenhouse_alias(company) {
            return Some(alias.to_string());
        }
        let base = self.cfg.greenhouse_base_url.trim_end_matches('/').to_string();
        self.probe_variations(company, |v| format!("{base}/v1/boards/{v}"), HeaderMap::new)
            .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> SourceClient {
        let cfg = SourcesConfig {
            github_api_url: server.uri(),
            greenhouse_base_url: server.uri(),
            ..Default::default()
        };
        SourceClient::with_github_token(&cfg, None).unwrap()
    }

    #[tokio::test]
    async fn alias_resolves_without_probing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let c = client(&server);
        assert_eq!(c.resolve_github_org("Anthropic").await.as_deref(), Some("anthropics"));
        assert_eq!(c.resolve_greenhouse_board("OpenAI").await.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn probe_returns_first_confirmed_variation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme-labs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orgs/acmelabs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let c = client(&server);
        assert_eq!(c.resolve_github_org("Acme Labs").await.as_deref(), Some("acme-labs"));
    }

    #[tokio::test]
    async fn unresolved_name_is_none() {
        let server = MockServer::start().await;
        let c = client(&server);
        assert_eq!(c.resolve_greenhouse_board("Nobody Inc").await, None);
    }
}
