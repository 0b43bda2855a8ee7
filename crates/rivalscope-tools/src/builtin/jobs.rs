// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rivalscope_sources::{competitive_score, JobRecord};
use serde_json::Value;

use super::company_only_schema;
use crate::context::unavailable_summary;
use crate::tool::required_str;
use crate::{JobsResult, Tool, ToolContext, ToolPayload};

pub struct GetJobsTool {
    ctx: Arc<ToolContext>,
}

impl GetJobsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetJobsTool {
    fn name(&self) -> &str {
        "get_jobs"
    }

    fn description(&self) -> &str {
        "Get all current job postings for a company with full details: titles, departments, \
         locations and descriptions, plus a department histogram and a competitive hiring \
         score. Use it to decode organisational strategy and skill priorities."
    }

    fn parameters_schema(&self) -> Value {
        company_only_schema()
    }

    async fn execute(&self, args: &Value) -> anyhow::Result<ToolPayload> {
        let company = required_str(args, "company")?;

        let mut stored = self.ctx.stored::<JobRecord>(company).await?;
        let mut refresh_error = None;
        if stored.is_empty() && self.ctx.cfg.refresh_on_miss {
            let fetched = self.ctx.sources.fetch_jobs(company).await;
            refresh_error = self.ctx.persist_fetch(company, fetched).await;
            stored = self.ctx.stored(company).await?;
        }

        let jobs: Vec<JobRecord> = stored.iter().map(|s| s.record.clone()).collect();
        let mut departments: BTreeMap<String, usize> = BTreeMap::new();
        for job in &jobs {
            *departments.entry(job.department.clone()).or_default() += 1;
        }

        let top = departments.iter().max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)));
        let summary = match (top, refresh_error) {
            (None, Some(reason)) => unavailable_summary("Job", company, &reason),
            (None, None) => format!(
                "No public job postings found for {company}. \
                 They may not use Greenhouse or have no public board."
            ),
            (Some((dept, n)), _) => format!(
                "Found {} open positions for {company}. Top department: {dept} ({n} roles)",
                jobs.len()
            ),
        };

        Ok(ToolPayload::Jobs(JobsResult {
            summary,
            count: jobs.len(),
            departments,
            competitive_score: competitive_score(&jobs),
            all_jobs: stored,
        }))
    }
}
