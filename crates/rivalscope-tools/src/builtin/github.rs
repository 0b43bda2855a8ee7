// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use rivalscope_sources::github::top_by_stars;
use rivalscope_sources::RepoRecord;
use serde_json::Value;

use super::company_only_schema;
use crate::context::unavailable_summary;
use crate::tool::required_str;
use crate::{ReposResult, Tool, ToolContext, ToolPayload};

pub struct GetGithubTool {
    ctx: Arc<ToolContext>,
}

impl GetGithubTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetGithubTool {
    fn name(&self) -> &str {
        "get_github"
    }

    fn description(&self) -> &str {
        "Get all public GitHub repositories of a company's organisation, most starred first, \
         with stars, forks, languages, topics and README excerpts for popular repositories. \
         Use it to judge developer engagement and open-source strategy."
    }

    fn parameters_schema(&self) -> Value {
        company_only_schema()
    }

    async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload> {
        let company = required_str(args, "company")?;

        let mut repos = self.ctx.stored::<RepoRecord>(company).await?;
        let mut refresh_error = None;
        if repos.is_empty() && self.ctx.cfg.refresh_on_miss {
            let limit = self.ctx.sources.config().stored_repo_limit;
            let fetched = self.ctx.sources.fetch_github(company).await.map(|mut outcome| {
                outcome.records = top_by_stars(&outcome.records, limit);
                outcome
            });
            refresh_error = self.ctx.persist_fetch(company, fetched).await;
            repos = self.ctx.stored(company).await?;
        }
        repos.sort_by(|a, b| b.record.stars.cmp(&a.record.stars));

        let total_stars: u64 = repos.iter().map(|r| r.record.stars).sum();
        let total_forks: u64 = repos.iter().map(|r| r.record.forks).sum();
        let summary = match (repos.first(), refresh_error) {
            (None, Some(reason)) => unavailable_summary("GitHub", company, &reason),
            (None, None) => format!("No GitHub repositories found for {company}."),
            (Some(top), _) => format!(
                "Found {} repositories for {company}. Total stars: {total_stars}. \
                 Top repo: {} ({} stars)",
                repos.len(),
                top.record.name,
                top.record.stars
            ),
        };

        Ok(ToolPayload::Repos(ReposResult {
            summary,
            count: repos.len(),
            total_stars,
            total_forks,
            all_repos: repos,
        }))
    }
}
