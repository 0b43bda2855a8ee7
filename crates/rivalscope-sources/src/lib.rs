// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Fetchers for the four public intelligence sources.
//!
//! Every fetcher takes a company name and returns a [`FetchOutcome`].  "No
//! data" is a successful, empty outcome with an explanatory summary; only
//! transport failures and undecodable bodies are errors.

mod client;
mod error;
pub mod github;
pub mod jobs;
pub mod news;
pub mod patents;
pub mod recency;
pub mod resolve;
pub mod score;
pub mod sentiment;

pub use client::SourceClient;
pub use error::SourceError;
pub use github::{RepoActivity, RepoRecord};
pub use jobs::{JobInsights, JobRecord};
pub use news::{NewsInsights, NewsRecord};
pub use patents::PatentRecord;
pub use score::{competitive_score, CompetitiveScore, ThreatLevel};
pub use sentiment::Sentiment;

use serde::Serialize;

/// Normalised result of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome<R> {
    /// Source-side identifier the company resolved to (board token,
    /// organisation, assignee query), if any.
    pub resolved: Option<String>,
    pub records: Vec<R>,
    pub summary: String,
}

impl<R> FetchOutcome<R> {
    pub fn empty(summary: impl Into<String>) -> Self {
        Self { resolved: None, records: Vec::new(), summary: summary.into() }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A `(name, count)` pair in a ranked histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Count occurrences and keep the `n` most frequent, ties broken by name.
pub(crate) fn top_counts<'a>(items: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<NameCount> {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    let mut ranked: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount { name: name.to_string(), count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(n);
    ranked
}

/// First `max` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
