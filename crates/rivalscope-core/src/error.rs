// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use rivalscope_model::ModelError;
use thiserror::Error;

/// Why a user turn failed.  The conversation is left as it was before the
/// turn in every case.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model kept answering with rate-limit errors until the backoff
    /// budget ran out.
    #[error("Gemini API rate limit exceeded. Please try again in a few moments.")]
    RateLimited,

    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for AgentError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::RateLimited(_) => Self::RateLimited,
            other => Self::Model(other),
        }
    }
}
