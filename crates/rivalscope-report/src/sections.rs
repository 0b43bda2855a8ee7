// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Best-effort extraction of the answer's headline sections for display.
//!
//! Nothing here is authoritative: when a pattern does not match, the
//! caller falls back to rendering the whole answer.

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub executive_summary: Option<String>,
    pub strategic_reasoning: Option<String>,
    pub predictions: Option<String>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.executive_summary.is_none()
            && self.strategic_reasoning.is_none()
            && self.predictions.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("high confidence") {
            Self::High
        } else if lower.contains("low confidence") || lower.contains("lower confidence") {
            Self::Low
        } else {
            Self::Medium
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    /// `30-Day Forecast`, `60-Day Forecast` or `90-Day Forecast`.
    pub horizon: &'static str,
    pub text: String,
    pub confidence: Confidence,
}

const EXEC_START: &str = r"(?i)(?:##?\s*)?Executive Summary[ \t:]*\n";
const EXEC_STOP: &str = r"(?i)\n##\s+(?:Strategic Reasoning|📊|🧠|Step|Predictions)";
const REASONING_START: &str =
    r"(?i)(?:##?\s*)?(?:Strategic Reasoning|Detailed Strategic Analysis|🧠)[ \t:]*\n";
const REASONING_STOP: &str = r"(?i)\n##\s+(?:Predictions|Evidence-Based Predictions|🔮|Step 3)";
const PREDICTIONS_START: &str =
    r"(?i)(?:##?\s*)?(?:Predictions|Evidence-Based Predictions|Strategic Predictions|🔮)[ \t:]*\n";

/// Split an analysis into executive summary, strategic reasoning and
/// predictions.  Each part is located independently.
pub fn parse_sections(text: &str) -> Sections {
    Sections {
        executive_summary: between(text, EXEC_START, Some(EXEC_STOP)),
        strategic_reasoning: between(text, REASONING_START, Some(REASONING_STOP)),
        predictions: between(text, PREDICTIONS_START, None),
    }
}

/// Bold-headed subsections (`**Patent Analysis:**`, `**Hiring Pattern …:**`,
/// `**Cross-Signal Correlation:**`) in order of first appearance.  A title
/// matched by more than one rule keeps the body of the last rule.
pub fn parse_subsections(text: &str) -> Vec<(String, String)> {
    let rules: [(&str, &str); 3] = [
        (
            r"(?i)\*\*([^*]+Analysis[^*]*)\*\*[ \t:]*\n",
            r"(?i)\n\*\*[^*]+Analysis|\n\*\*Cross-Signal",
        ),
        (r"(?i)\*\*([^*]+Pattern[^*]*)\*\*[ \t:]*\n", r"\n\*\*[^*]+|\n##"),
        (r"(?i)\*\*(Cross-Signal Correlation):\*\*", r"\n##"),
    ];

    let mut out: Vec<(String, String)> = Vec::new();
    for (start, stop) in rules {
        let (Ok(start), Ok(stop)) = (Regex::new(start), Regex::new(stop)) else {
            continue;
        };
        let mut pos = 0;
        while let Some(caps) = start.captures_at(text, pos) {
            let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let rest = &text[whole.end()..];
            let body_end = stop.find(rest).map_or(rest.len(), |m| m.start());
            pos = whole.end() + body_end;

            let title = title.as_str().trim().trim_end_matches(':').trim().to_string();
            let body = rest[..body_end].trim();
            if body.is_empty() {
                continue;
            }
            match out.iter_mut().find(|(t, _)| *t == title) {
                Some(existing) => existing.1 = body.to_string(),
                None => out.push((title, body.to_string())),
            }
        }
    }
    out
}

/// 30/60/90-day forecasts from a predictions section, with the confidence
/// each one states (medium when none is stated).
pub fn parse_forecasts(predictions: &str) -> Vec<Forecast> {
    let horizons: [(&'static str, &str, Option<&str>); 3] = [
        ("30-Day Forecast", r"(?i)30-Day[^:]*:", Some(r"(?i)60-Day|90-Day")),
        ("60-Day Forecast", r"(?i)60-Day[^:]*:", Some(r"(?i)90-Day")),
        ("90-Day Forecast", r"(?i)90-Day[^:]*:", None),
    ];

    horizons
        .into_iter()
        .filter_map(|(horizon, start, stop)| {
            let body = between_raw(predictions, start, stop)?;
            let text = body.trim_matches(|c: char| c.is_whitespace() || c == '*').to_string();
            (!text.is_empty()).then(|| Forecast {
                horizon,
                confidence: Confidence::detect(&text),
                text,
            })
        })
        .collect()
}

/// Trimmed text following the first `start` match, up to the first `stop`
/// match after it (or the end of the text).
fn between(text: &str, start: &str, stop: Option<&str>) -> Option<String> {
    let body = between_raw(text, start, stop)?.trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn between_raw<'a>(text: &'a str, start: &str, stop: Option<&str>) -> Option<&'a str> {
    let m = Regex::new(start).ok()?.find(text)?;
    let rest = &text[m.end()..];
    let end = match stop {
        Some(stop) => Regex::new(stop).ok()?.find(rest).map_or(rest.len(), |s| s.start()),
        None => rest.len(),
    };
    Some(&rest[..end])
}
