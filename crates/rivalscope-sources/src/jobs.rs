// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Greenhouse job-board fetcher.

use chrono::Utc;
use reqwest::StatusCode;
use rivalscope_store::{Collection, StoreRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::recency::{is_recent, parse_timestamp};
use crate::score::{competitive_score, CompetitiveScore};
use crate::{top_counts, truncate_chars, FetchOutcome, NameCount, SourceClient, SourceError};

const DESCRIPTION_LIMIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    pub posted_date: String,
    pub url: String,
    pub description: String,
}

impl StoreRecord for JobRecord {
    const COLLECTION: Collection = Collection::Jobs;

    fn natural_id(&self) -> String {
        self.job_id.clone()
    }
}

#[derive(Deserialize)]
struct BoardJobs {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Deserialize)]
struct RawJob {
    id: u64,
    #[serde(default)]
    title: String,
    updated_at: Option<String>,
    location: Option<Named>,
    #[serde(default)]
    departments: Vec<Named>,
    #[serde(default)]
    absolute_url: String,
    content: Option<String>,
}

#[derive(Deserialize)]
struct Named {
    name: Option<String>,
}

impl RawJob {
    fn into_record(self, posted_date: String) -> JobRecord {
        let department = self
            .departments
            .into_iter()
            .next()
            .and_then(|d| d.name)
            .unwrap_or_else(|| "N/A".into());
        let location = self.location.and_then(|l| l.name).unwrap_or_else(|| "N/A".into());
        let description = truncate_chars(self.content.as_deref().unwrap_or_default().trim(), DESCRIPTION_LIMIT);
        JobRecord {
            job_id: self.id.to_string(),
            title: self.title,
            department,
            location,
            posted_date,
            url: self.absolute_url,
            description,
        }
    }
}

impl SourceClient {
    /// Jobs updated within the configured window on the company's public
    /// Greenhouse board.
    pub async fn fetch_jobs(&self, company: &str) -> Result<FetchOutcome<JobRecord>, SourceError> {
        let no_board = || {
            FetchOutcome::empty(format!("{company} does not have a public Greenhouse job board"))
        };

        let Some(board) = self.resolve_greenhouse_board(company).await else {
            info!(%company, "no Greenhouse board resolved");
            return Ok(no_board());
        };

        let url = format!(
            "{}/v1/boards/{board}/jobs",
            self.cfg.greenhouse_base_url.trim_end_matches('/')
        );
        debug!(%url, "fetching Greenhouse jobs");
        let resp = self.http.get(&url).query(&[("content", "true")]).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                info!(%company, %board, "Greenhouse board not found");
                return Ok(no_board());
            }
            s if !s.is_success() => {
                return Err(SourceError::UpstreamStatus { url, status: s.as_u16() });
            }
            _ => {}
        }

        let body: BoardJobs = resp.json().await.map_err(|e| SourceError::Decode(e.to_string()))?;

        let now = Utc::now();
        let window = self.cfg.job_window_days;
        let mut records = Vec::new();
        for job in body.jobs {
            let raw_date = job.updated_at.clone().unwrap_or_default();
            match parse_timestamp(&raw_date) {
                Some(ts) if is_recent(ts, now, window) => records.push(job.into_record(raw_date)),
                Some(_) => {}
                None => warn!(job_id = job.id, updated_at = %raw_date, "skipping job with unparsable date"),
            }
        }

        info!(%company, %board, count = records.len(), "fetched recent jobs");
        Ok(FetchOutcome {
            resolved: Some(board),
            summary: format!(
                "{company} has {} active job postings in the last {window} days",
                records.len()
            ),
            records,
        })
    }
}

/// Aggregate view of a job set for reports and the HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInsights {
    pub summary: String,
    pub hiring_velocity: String,
    pub top_departments: Vec<NameCount>,
    pub top_locations: Vec<NameCount>,
    pub competitive_score: CompetitiveScore,
}

impl JobInsights {
    pub fn from_jobs(company: &str, jobs: &[JobRecord], window_days: i64) -> Self {
        if jobs.is_empty() {
            return Self {
                summary: format!("No recent job postings found for {company}"),
                hiring_velocity: "None".into(),
                top_departments: Vec::new(),
                top_locations: Vec::new(),
                competitive_score: competitive_score(jobs),
            };
        }
        let velocity = match jobs.len() {
            n if n > 20 => "High",
            n if n > 10 => "Moderate",
            _ => "Low",
        };
        Self {
            summary: format!(
                "{company} has {} active job postings in the last {window_days} days",
                jobs.len()
            ),
            hiring_velocity: velocity.into(),
            top_departments: top_counts(jobs.iter().map(|j| j.department.as_str()), 5),
            top_locations: top_counts(jobs.iter().map(|j| j.location.as_str()), 5),
            competitive_score: competitive_score(jobs),
        }
    }
}
