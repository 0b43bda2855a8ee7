// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Competitive threat score derived from a company's open positions.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::JobRecord;

const STRATEGIC_KEYWORDS: &[&str] =
    &["research", "ai", "ml", "engineering", "product", "sales", "enterprise"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    None,
    Minimal,
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Medium
        } else if score >= 25.0 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Minimal => "MINIMAL",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component scores are kept unrounded; they are rounded to one decimal
/// only when serialised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitiveScore {
    #[serde(serialize_with = "one_decimal")]
    pub overall_score: f64,
    pub threat_level: ThreatLevel,
    #[serde(serialize_with = "one_decimal")]
    pub velocity_score: f64,
    #[serde(serialize_with = "one_decimal")]
    pub diversity_score: f64,
    #[serde(serialize_with = "one_decimal")]
    pub strategic_score: f64,
    pub reasoning: String,
}

fn one_decimal<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((v * 10.0).round() / 10.0)
}

/// Score a job set on a 0–100 scale.
///
/// velocity (≤40) grows by one point per five jobs, diversity (≤30) rewards
/// distinct departments and locations, strategic (≤30) counts jobs in
/// high-value departments.  Each component is capped before summing.
pub fn competitive_score(jobs: &[JobRecord]) -> CompetitiveScore {
    if jobs.is_empty() {
        return CompetitiveScore {
            overall_score: 0.0,
            threat_level: ThreatLevel::None,
            velocity_score: 0.0,
            diversity_score: 0.0,
            strategic_score: 0.0,
            reasoning: "No hiring activity detected".into(),
        };
    }

    let velocity = (jobs.len() as f64 / 5.0).min(40.0);

    let departments: HashSet<&str> = jobs.iter().map(|j| j.department.as_str()).collect();
    let locations: HashSet<&str> = jobs.iter().map(|j| j.location.as_str()).collect();
    let diversity = ((departments.len() * 3 + locations.len() * 2) as f64).min(30.0);

    let strategic_jobs = jobs
        .iter()
        .filter(|j| {
            let dept = j.department.to_lowercase();
            STRATEGIC_KEYWORDS.iter().any(|k| dept.contains(k))
        })
        .count();
    let strategic = ((strategic_jobs * 2) as f64).min(30.0);

    let overall = velocity + diversity + strategic;
    let level = ThreatLevel::from_score(overall);

    CompetitiveScore {
        overall_score: overall,
        threat_level: level,
        velocity_score: velocity,
        diversity_score: diversity,
        strategic_score: strategic,
        reasoning: format!(
            "{} open positions across {} departments signals {} competitive activity",
            jobs.len(),
            departments.len(),
            level.as_str().to_lowercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(dept: &str, loc: &str) -> JobRecord {
        JobRecord {
            job_id: "1".into(),
            title: "Role".into(),
            department: dept.into(),
            location: loc.into(),
            posted_date: String::new(),
            url: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn empty_is_none() {
        let s = competitive_score(&[]);
        assert_eq!(s.overall_score, 0.0);
        assert_eq!(s.threat_level, ThreatLevel::None);
        assert_eq!(s.reasoning, "No hiring activity detected");
    }

    #[test]
    fn hundred_jobs_score_high() {
        let mut jobs = Vec::new();
        for i in 0..100 {
            jobs.push(job(&format!("Engineering {}", i % 5), &format!("City {}", i % 5)));
        }
        let s = competitive_score(&jobs);
        assert_eq!(s.velocity_score, 20.0);
        assert_eq!(s.diversity_score, 25.0);
        assert_eq!(s.strategic_score, 30.0);
        assert_eq!(s.overall_score, 75.0);
        assert_eq!(s.threat_level, ThreatLevel::High);
        assert_eq!(
            s.reasoning,
            "100 open positions across 5 departments signals high competitive activity"
        );
    }

    #[test]
    fn components_are_capped_before_summing() {
        let jobs: Vec<JobRecord> = (0..400)
            .map(|i| job(&format!("Research {i}"), &format!("Loc {i}")))
            .collect();
        let s = competitive_score(&jobs);
        assert_eq!(s.velocity_score, 40.0);
        assert_eq!(s.diversity_score, 30.0);
        assert_eq!(s.strategic_score, 30.0);
        assert_eq!(s.overall_score, 100.0);
    }

    #[test]
    fn small_non_strategic_set_is_minimal() {
        let s = competitive_score(&[job("Legal", "Remote"), job("Legal", "Remote")]);
        assert!((s.overall_score - 5.4).abs() < 1e-9);
        assert_eq!(s.threat_level, ThreatLevel::Minimal);
    }

    #[test]
    fn serialises_rounded_uppercase() {
        let jobs = vec![job("Legal", "Remote"); 3];
        let v = serde_json::to_value(competitive_score(&jobs)).unwrap();
        assert_eq!(v["threat_level"], "MINIMAL");
        assert_eq!(v["velocity_score"], 0.6);
    }

    #[test]
    fn threat_level_boundaries_are_inclusive() {
        assert_eq!(ThreatLevel::from_score(100.0), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_score(75.0), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_score(74.999), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_score(50.0), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_score(49.999), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_score(25.0), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_score(24.999), ThreatLevel::Minimal);
        assert_eq!(ThreatLevel::from_score(0.0), ThreatLevel::Minimal);
    }
}
