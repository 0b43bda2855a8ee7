// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use rivalscope_sources::NewsRecord;
use serde_json::Value;

use super::company_only_schema;
use crate::context::unavailable_summary;
use crate::tool::required_str;
use crate::{NewsResult, Tool, ToolContext, ToolPayload};

pub struct GetNewsTool {
    ctx: Arc<ToolContext>,
}

impl GetNewsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetNewsTool {
    fn name(&self) -> &str {
        "get_news"
    }

    fn description(&self) -> &str {
        "Get all recent news articles about a company: headlines, publication dates, \
         sources, sentiment and article text, newest first. Use it to follow announcements, \
         partnerships and how the market perceives the company."
    }

    fn parameters_schema(&self) -> Value {
        company_only_schema()
    }

    async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload> {
        let company = required_str(args, "company")?;

        let mut articles = self.ctx.stored::<NewsRecord>(company).await?;
        let mut refresh_error = None;
        if articles.is_empty() && self.ctx.cfg.refresh_on_miss {
            let days_back = self.ctx.sources.config().news_days_back;
            let fetched = self.ctx.sources.fetch_news(company, days_back).await;
            refresh_error = self.ctx.persist_fetch(company, fetched).await;
            articles = self.ctx.stored(company).await?;
        }
        articles.sort_by(|a, b| b.record.published_date.cmp(&a.record.published_date));

        let mut summary = match (&refresh_error, articles.is_empty()) {
            (Some(reason), true) => unavailable_summary("News", company, reason),
            _ => format!("Found {} recent articles about {company}.", articles.len()),
        };
        if let Some(first) = articles.first() {
            summary.push_str(&format!(
                " Most recent: '{}' from {}",
                first.record.title, first.record.source
            ));
        }

        Ok(ToolPayload::News(NewsResult {
            summary,
            count: articles.len(),
            all_articles: articles,
        }))
    }
}
