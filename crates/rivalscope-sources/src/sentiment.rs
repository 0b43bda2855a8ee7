// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

const POSITIVE: &[&str] = &[
    "breakthrough", "success", "launch", "achieve", "win", "milestone", "innovation", "advance",
    "partner", "growth", "funding", "expand", "improve", "excel", "leader", "award", "celebrate",
];

const NEGATIVE: &[&str] = &[
    "lawsuit", "layoff", "controversy", "failure", "decline", "loss", "criticism", "concern",
    "issue", "problem", "challenge", "threat", "investigate", "violate", "scandal", "delay",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Keyword-presence heuristic: each listed keyword counts once if it occurs
/// anywhere in the lowercased text; the larger side wins, a tie is neutral.
pub fn classify(title: &str, summary: &str) -> Sentiment {
    let text = format!("{title} {summary}").to_lowercase();
    let positive = POSITIVE.iter().filter(|k| text.contains(*k)).count();
    let negative = NEGATIVE.iter().filter(|k| text.contains(*k)).count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_wins() {
        assert_eq!(classify("Acme announces breakthrough", "record growth"), Sentiment::Positive);
        assert_eq!(classify("Acme faces lawsuit", "amid layoff concern"), Sentiment::Negative);
    }

    #[test]
    fn tie_and_silence_are_neutral() {
        assert_eq!(classify("Launch delayed", ""), Sentiment::Neutral);
        assert_eq!(classify("Quarterly report", "nothing notable"), Sentiment::Neutral);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        assert_eq!(
            classify("Lawsuit after lawsuit", "a breakthrough and a milestone"),
            Sentiment::Positive
        );
    }
}
