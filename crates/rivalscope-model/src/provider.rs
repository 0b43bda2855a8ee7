// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;

use crate::{GenerateRequest, ModelError, ModelReply};

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name for status display.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Send the whole conversation and wait for one complete reply.
    ///
    /// Implementations must map quota exhaustion to
    /// [`ModelError::RateLimited`] so callers can back off.
    async fn generate(&self, req: &GenerateRequest) -> Result<ModelReply, ModelError>;
}
