// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider identifier: "google" (Gemini generateContent) or "mock".
    pub provider: String,
    /// Model name forwarded to the provider API
    pub name: String,
    /// Environment variable that holds the API key (read at runtime)
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    pub api_key: Option<String>,
    /// Base URL override, e.g. a local proxy.
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single completion
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Timeout for a single model request
    pub timeout_secs: u64,
    /// Backoff policy applied to rate-limited requests only
    pub retry: RetryConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "google".into(),
            name: "gemini-2.5-pro".into(),
            api_key_env: Some("GEMINI_API_KEY".into()),
            api_key: None,
            base_url: None,
            max_tokens: Some(16_384),
            temperature: Some(0.7),
            top_p: Some(0.95),
            timeout_secs: 120,
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff for `429 / RESOURCE_EXHAUSTED` responses.
///
/// The delay before attempt `n` (1-based, after the first failure) is
/// `initial_delay_ms * multiplier^(n-1)`, capped at `max_delay_ms`.  Retrying
/// stops after `max_attempts` total attempts or once the next sleep would
/// push past `deadline_secs` measured from the first attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub deadline_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay_ms: 2_000,
            multiplier: 2.0,
            max_delay_ms: 60_000,
            deadline_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hard ceiling on model requests within one user turn.
    pub max_round_trips: u32,
    /// System prompt override; leave None to use the built-in prompt
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_round_trips: 10,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub user_agent: String,
    /// Timeout for list/search requests
    pub timeout_secs: u64,
    /// Timeout for organisation / board existence probes
    pub probe_timeout_secs: u64,
    pub greenhouse_base_url: String,
    pub github_api_url: String,
    /// Environment variable holding an optional GitHub token
    pub github_token_env: String,
    pub news_rss_url: String,
    pub patents_base_url: String,
    /// Jobs updated within this many days count as active
    pub job_window_days: i64,
    /// Default look-back window for news
    pub news_days_back: i64,
    /// Repositories updated within this many days count as recently active
    pub repo_window_days: i64,
    pub max_news_entries: usize,
    /// Pages of 100 repositories; 3 pages caps a listing at 300 repos
    pub max_repo_pages: u32,
    /// READMEs are only fetched for repositories above this star count
    pub readme_star_threshold: u64,
    /// Number of top repositories (by stars) written to the store
    pub stored_repo_limit: usize,
    /// Company used when a request does not name one
    pub default_company: String,
    /// Companies scraped by the jobs endpoint when asked for "all"
    pub companies: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_agent: "rivalscope/0.3 (competitive-intelligence agent)".into(),
            timeout_secs: 20,
            probe_timeout_secs: 5,
            greenhouse_base_url: "https://boards-api.greenhouse.io".into(),
            github_api_url: "https://api.github.com".into(),
            github_token_env: "GITHUB_TOKEN".into(),
            news_rss_url: "https://news.google.com/rss/search".into(),
            patents_base_url: "https://patents.google.com".into(),
            job_window_days: 30,
            news_days_back: 7,
            repo_window_days: 30,
            max_news_entries: 50,
            max_repo_pages: 3,
            readme_star_threshold: 100,
            stored_repo_limit: 50,
            default_company: "Anthropic".into(),
            companies: vec!["anthropic".into(), "openai".into(), "google".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON file per document under `store.root`
    #[default]
    Fs,
    /// Process-local map; contents are lost on exit
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Fs,
            root: PathBuf::from(".rivalscope/store"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Run the live fetcher when the store holds nothing for a company
    #[serde(default = "default_true")]
    pub refresh_on_miss: bool,
    pub default_patent_limit: u32,
    pub max_patent_limit: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            refresh_on_miss: true,
            default_patent_limit: 50,
            max_patent_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
            body_limit: 64 * 1024,
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
