// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),

    /// HTTP 429 or a `RESOURCE_EXHAUSTED` status; the only retryable error.
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode model reply: {0}")]
    Decode(String),
}

impl ModelError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
