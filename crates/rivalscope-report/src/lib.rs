// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Report export for a finished analysis: Markdown, HTML and JSON renderings
//! of the same payload, plus best-effort section parsing for display.

mod html;
mod markdown;
pub mod sections;

use chrono::{DateTime, Utc};
use rivalscope_tools::ToolCallRecord;
use serde::Serialize;
use serde_json::json;

pub use sections::{parse_forecasts, parse_sections, parse_subsections, Confidence, Forecast, Sections};

/// Version stamped into JSON exports.
pub const REPORT_VERSION: &str = "1.0";

/// A finished analysis together with the tool calls that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub company: String,
    pub analysis: String,
    pub generated_at: DateTime<Utc>,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Records returned by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

impl Report {
    pub fn new(
        company: impl Into<String>,
        analysis: impl Into<String>,
        tool_calls: Vec<ToolCallRecord>,
    ) -> Self {
        Self {
            company: company.into(),
            analysis: analysis.into(),
            generated_at: Utc::now(),
            tool_calls,
        }
    }

    /// Per-source record counts in first-call order.  A source queried more
    /// than once reports the count of its last call.
    pub fn source_counts(&self) -> Vec<SourceCount> {
        let mut counts: Vec<SourceCount> = Vec::new();
        for call in &self.tool_calls {
            let source = source_label(&call.name);
            let count = call.result.count();
            match counts.iter_mut().find(|c| c.source == source) {
                Some(existing) => existing.count = count,
                None => counts.push(SourceCount { source, count }),
            }
        }
        counts
    }

    /// Sum of [`Report::source_counts`].
    pub fn data_points(&self) -> usize {
        self.source_counts().iter().map(|c| c.count).sum()
    }

    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }

    pub fn to_html(&self) -> String {
        html::render(self)
    }

    /// Full export: metadata, totals, the analysis and every tool call with
    /// its complete result.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let data_sources: Vec<_> = self
            .tool_calls
            .iter()
            .map(|c| json!({ "name": c.name, "args": c.arguments, "result": c.result }))
            .collect();
        let total_data_points: usize = self.tool_calls.iter().map(|c| c.result.count()).sum();

        serde_json::to_string_pretty(&json!({
            "metadata": {
                "company": self.company,
                "generated_at": self.generated_at.to_rfc3339(),
                "report_type": "competitive_intelligence",
                "version": REPORT_VERSION,
            },
            "summary": {
                "total_sources": self.tool_calls.len(),
                "total_data_points": total_data_points,
            },
            "analysis": self.analysis,
            "data_sources": data_sources,
        }))
    }

    pub(crate) fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// `get_github` → `Github`.
fn source_label(tool_name: &str) -> String {
    title_case(tool_name.strip_prefix("get_").unwrap_or(tool_name))
}

/// `get_github` → `Get Github`.
pub(crate) fn call_title(tool_name: &str) -> String {
    title_case(&tool_name.replace('_', " "))
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use rivalscope_tools::{ReposResult, ToolPayload};
    use serde_json::Value;

    use super::*;

    pub(crate) fn call(name: &str, count: usize) -> ToolCallRecord {
        ToolCallRecord {
            name: name.into(),
            arguments: json!({ "company": "Anthropic" }),
            result: ToolPayload::Repos(ReposResult {
                summary: format!("Found {count} items"),
                count,
                total_stars: 0,
                total_forks: 0,
                all_repos: vec![],
            }),
        }
    }

    pub(crate) fn sample() -> Report {
        Report::new(
            "Anthropic",
            "## Executive Summary\nAnthropic is <b>hiring</b>.",
            vec![call("get_jobs", 12), call("get_github", 3)],
        )
    }

    #[test]
    fn source_counts_keep_order_and_last_call_wins() {
        let r = Report::new(
            "Acme",
            "",
            vec![call("get_jobs", 5), call("get_news", 2), call("get_jobs", 7)],
        );
        assert_eq!(
            r.source_counts(),
            vec![
                SourceCount { source: "Jobs".into(), count: 7 },
                SourceCount { source: "News".into(), count: 2 },
            ]
        );
        assert_eq!(r.data_points(), 9);
    }

    #[test]
    fn labels() {
        assert_eq!(source_label("get_github"), "Github");
        assert_eq!(call_title("get_patents"), "Get Patents");
    }

    #[test]
    fn json_export_shape() {
        let v: Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(v["metadata"]["company"], "Anthropic");
        assert_eq!(v["metadata"]["report_type"], "competitive_intelligence");
        assert_eq!(v["metadata"]["version"], "1.0");
        assert_eq!(v["summary"]["total_sources"], 2);
        assert_eq!(v["summary"]["total_data_points"], 15);
        assert_eq!(v["data_sources"][0]["name"], "get_jobs");
        assert_eq!(v["data_sources"][0]["args"]["company"], "Anthropic");
        assert_eq!(v["data_sources"][1]["result"]["count"], 3);
        assert!(v["analysis"].as_str().unwrap().contains("Executive Summary"));
    }
}
