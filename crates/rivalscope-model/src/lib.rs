// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod error;
mod google;
mod mock;
mod provider;
mod retry;
mod types;

pub use error::ModelError;
pub use google::GeminiProvider;
pub use mock::{MockProvider, ScriptedMockProvider};
pub use provider::ModelProvider;
pub use retry::{generate_with_backoff, Backoff};
pub use types::*;

use std::time::Duration;

use anyhow::bail;
use rivalscope_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Provider selection:
/// - `"google"` / `"gemini"` → [`GeminiProvider`]; fails if no API key resolves
/// - `"mock"` → [`MockProvider`] (echo-back, offline)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    match cfg.provider.as_str() {
        "google" | "gemini" => {
            let key = resolve_api_key(cfg).ok_or_else(|| {
                ModelError::MissingApiKey(
                    cfg.api_key_env.clone().unwrap_or_else(|| "GEMINI_API_KEY".into()),
                )
            })?;
            Ok(Box::new(GeminiProvider::new(
                cfg.name.clone(),
                key,
                cfg.base_url.clone(),
                cfg.max_tokens,
                cfg.temperature,
                cfg.top_p,
                Duration::from_secs(cfg.timeout_secs),
            )?))
        }
        "mock" => Ok(Box::new(MockProvider)),
        other => bail!("unknown model provider: {other}"),
    }
}

fn resolve_api_key(cfg: &ModelConfig) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    if let Some(env) = &cfg.api_key_env {
        return std::env::var(env).ok().filter(|k| !k.is_empty());
    }
    None
}
