// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::ToolPayload;

/// One executed tool call, kept for the current turn only.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub result: ToolPayload,
}

/// Trait that every intelligence tool must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;
    /// Execute the tool.  An `Err` is turned into an `{error}` payload by
    /// the registry, so implementations may use `?` freely.
    async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload>;
}

/// Required string argument, trimmed.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: {key}"))
}
