// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{Tool, ToolPayload};

/// A tool schema – mirrors rivalscope_model::ToolDeclaration but keeps the
/// tools crate independent from the model crate.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Central registry holding all available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Schemas for every registered tool, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Run the named tool.  Never fails: an unknown name or a tool error
    /// becomes an `{error}` payload for the model to read.
    pub async fn dispatch(&self, name: &str, args: &Value) -> ToolPayload {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "model requested unknown tool");
            return ToolPayload::error(format!("Unknown function: {name}"));
        };
        debug!(tool = %name, %args, "dispatching tool");
        match tool.execute(args).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(tool = %name, error = %e, "tool failed");
                ToolPayload::error(e.to_string())
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{NewsResult, Tool};

    /// Minimal tool that reports how many keys its arguments had.
    struct CountingTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "counts argument keys"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload> {
            let n = args.as_object().map(|o| o.len()).unwrap_or(0);
            Ok(ToolPayload::News(NewsResult {
                summary: format!("{n} keys"),
                count: n,
                all_articles: vec![],
            }))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "fails"
        }
        fn description(&self) -> &str {
            "always fails"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, _args: &Value) -> anyhow::Result<ToolPayload> {
            anyhow::bail!("backend unavailable")
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(CountingTool { name: "count" });
        assert!(reg.get("count").is_some());
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn schemas_sorted_by_name() {
        let mut reg = ToolRegistry::new();
        reg.register(CountingTool { name: "b" });
        reg.register(CountingTool { name: "a" });
        let names: Vec<String> = reg.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reg.schemas()[0].description, "counts argument keys");
    }

    #[tokio::test]
    async fn dispatch_runs_registered_tool() {
        let mut reg = ToolRegistry::new();
        reg.register(CountingTool { name: "count" });
        let out = reg.dispatch("count", &json!({"a": 1, "b": 2})).await;
        assert_eq!(out.count(), 2);
    }

    #[tokio::test]
    async fn dispatch_unknown_yields_error_payload() {
        let reg = ToolRegistry::new();
        let out = reg.dispatch("get_weather", &json!({})).await;
        assert_eq!(out.to_value(), json!({ "error": "Unknown function: get_weather" }));
    }

    #[tokio::test]
    async fn dispatch_tool_error_yields_error_payload() {
        let mut reg = ToolRegistry::new();
        reg.register(FailingTool);
        let out = reg.dispatch("fails", &json!({})).await;
        assert!(out.is_error());
        assert_eq!(out.summary(), "backend unavailable");
    }
}
