// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

use rivalscope_sources::{CompetitiveScore, JobRecord, NewsRecord, PatentRecord, RepoRecord};
use rivalscope_store::Stamped;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct PatentsResult {
    pub summary: String,
    pub count: usize,
    pub patents: Vec<PatentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobsResult {
    pub summary: String,
    pub count: usize,
    pub departments: BTreeMap<String, usize>,
    pub competitive_score: CompetitiveScore,
    pub all_jobs: Vec<Stamped<JobRecord>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsResult {
    pub summary: String,
    pub count: usize,
    pub all_articles: Vec<Stamped<NewsRecord>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReposResult {
    pub summary: String,
    pub count: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub all_repos: Vec<Stamped<RepoRecord>>,
}

/// Result of one tool call as the model sees it.
///
/// Serialised untagged: every variant is a plain object with `summary` and
/// `count`, or `{ "error": ... }`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Patents(PatentsResult),
    Jobs(JobsResult),
    News(NewsResult),
    Repos(ReposResult),
    Error { error: String },
}

impl ToolPayload {
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { error: msg.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Number of records carried; zero for errors.
    pub fn count(&self) -> usize {
        match self {
            Self::Patents(r) => r.count,
            Self::Jobs(r) => r.count,
            Self::News(r) => r.count,
            Self::Repos(r) => r.count,
            Self::Error { .. } => 0,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            Self::Patents(r) => &r.summary,
            Self::Jobs(r) => &r.summary,
            Self::News(r) => &r.summary,
            Self::Repos(r) => &r.summary,
            Self::Error { error } => error,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| json!({ "error": e.to_string() }))
    }
}
