// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("could not decode upstream response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Transport or status failure at the remote end, as opposed to a body
    /// this crate could not understand.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::UpstreamStatus { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "Upstream",
            Self::UpstreamStatus { .. } => "UpstreamStatus",
            Self::Decode(_) => "Decode",
        }
    }
}
