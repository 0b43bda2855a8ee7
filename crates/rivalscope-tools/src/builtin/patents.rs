// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::required_str;
use crate::{PatentsResult, Tool, ToolContext, ToolPayload};

pub struct GetPatentsTool {
    ctx: Arc<ToolContext>,
}

impl GetPatentsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }

    fn limit(&self, args: &Value) -> usize {
        let max = self.ctx.cfg.max_patent_limit.max(1);
        let requested = args
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(self.ctx.cfg.default_patent_limit as u64);
        requested.clamp(1, max as u64) as usize
    }
}

#[async_trait]
impl Tool for GetPatentsTool {
    fn name(&self) -> &str {
        "get_patents"
    }

    fn description(&self) -> &str {
        "Get recent patent filings for a company from Google Patents: titles, abstracts, \
         dates and URLs. Use it to see which technologies the company is developing and \
         where its R&D is focused. Prefer the default of 50 patents; more data gives \
         better strategic insight."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company": {
                    "type": "string",
                    "description": "Company name (Anthropic, OpenAI, Google, or any company)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of recent patents to retrieve. Default 50, maximum 100."
                }
            },
            "required": ["company"]
        })
    }

    async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload> {
        let company = required_str(args, "company")?;
        let limit = self.limit(args);

        let result = match self.ctx.sources.fetch_patents(company, limit).await {
            Ok(outcome) => PatentsResult {
                summary: outcome.summary,
                count: outcome.records.len(),
                patents: outcome.records,
                error: None,
            },
            Err(e) => {
                let reason: String = e.to_string().chars().take(100).collect();
                PatentsResult {
                    summary: format!(
                        "Patent data for {company} is temporarily unavailable ({reason}). \
                         Analysis will focus on jobs, news, and GitHub data."
                    ),
                    count: 0,
                    patents: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        Ok(ToolPayload::Patents(result))
    }
}

#[cfg(test)]
mod tests {
    use rivalscope_config::{SourcesConfig, ToolsConfig};
    use rivalscope_sources::SourceClient;
    use rivalscope_store::MemoryStore;

    use super::*;

    fn tool() -> GetPatentsTool {
        let sources = SourceClient::with_github_token(&SourcesConfig::default(), None).unwrap();
        GetPatentsTool::new(Arc::new(ToolContext::new(
            sources,
            Arc::new(MemoryStore::new()),
            ToolsConfig::default(),
        )))
    }

    #[test]
    fn limit_defaults_and_clamps() {
        let t = tool();
        assert_eq!(t.limit(&json!({})), 50);
        assert_eq!(t.limit(&json!({"limit": 10})), 10);
        assert_eq!(t.limit(&json!({"limit": 500})), 100);
        assert_eq!(t.limit(&json!({"limit": 0})), 1);
    }
}
