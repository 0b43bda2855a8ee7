// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! GitHub organisation repository fetcher.

use base64::Engine;
use chrono::{DateTime, Utc};
use rivalscope_store::{Collection, StoreRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::recency::{is_recent, parse_timestamp};
use crate::{truncate_chars, FetchOutcome, SourceClient, SourceError};

const PER_PAGE: usize = 100;
const DESCRIPTION_LIMIT: usize = 500;
const README_LIMIT: usize = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub readme: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
}

impl StoreRecord for RepoRecord {
    const COLLECTION: Collection = Collection::Github;

    fn natural_id(&self) -> String {
        self.name.clone()
    }
}

#[derive(Deserialize)]
struct RawRepo {
    name: String,
    #[serde(default)]
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Deserialize)]
struct RawReadme {
    #[serde(default)]
    content: String,
}

fn decode_readme(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact).ok()?;
    Some(truncate_chars(&String::from_utf8_lossy(&bytes), README_LIMIT))
}

impl SourceClient {
    async fn fetch_readme(&self, full_name: &str) -> Option<String> {
        let url = format!(
            "{}/repos/{full_name}/readme",
            self.cfg.github_api_url.trim_end_matches('/')
        );
        let resp = match self.http.get(&url).headers(self.github_headers()).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(%full_name, status = r.status().as_u16(), "no README");
                return None;
            }
            Err(e) => {
                debug!(%full_name, error = %e, "README request failed");
                return None;
            }
        };
        match resp.json::<RawReadme>().await {
            Ok(raw) => decode_readme(&raw.content),
            Err(e) => {
                debug!(%full_name, error = %e, "README body unreadable");
                None
            }
        }
    }

    /// All repositories of the company's organisation, most recently updated
    /// first, capped at `max_repo_pages` pages of 100.
    pub async fn fetch_github(&self, company: &str) -> Result<FetchOutcome<RepoRecord>, SourceError> {
        let Some(org) = self.resolve_github_org(company).await else {
            warn!(%company, "could not resolve GitHub organisation");
            return Ok(FetchOutcome::empty(format!(
                "Could not find GitHub organization for \"{company}\""
            )));
        };

        let url = format!("{}/orgs/{org}/repos", self.cfg.github_api_url.trim_end_matches('/'));
        let mut raw_repos: Vec<RawRepo> = Vec::new();
        for page in 1..=self.cfg.max_repo_pages {
            debug!(%org, page, "listing repositories");
            let resp = self
                .http
                .get(&url)
                .headers(self.github_headers())
                .query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("sort", "updated".into()),
                    ("direction", "desc".into()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;
            if resp.status() != reqwest::StatusCode::OK {
                warn!(%org, page, status = resp.status().as_u16(), "stopping pagination");
                break;
            }
            let batch: Vec<RawRepo> =
                resp.json().await.map_err(|e| SourceError::Decode(e.to_string()))?;
            let short = batch.len() < PER_PAGE;
            if batch.is_empty() {
                break;
            }
            raw_repos.extend(batch);
            if short {
                break;
            }
        }

        let mut records = Vec::with_capacity(raw_repos.len());
        for raw in raw_repos {
            let readme = if raw.stargazers_count > self.cfg.readme_star_threshold {
                self.fetch_readme(&raw.full_name).await.unwrap_or_default()
            } else {
                String::new()
            };
            records.push(RepoRecord {
                description: truncate_chars(raw.description.as_deref().unwrap_or_default(), DESCRIPTION_LIMIT),
                name: raw.name,
                full_name: raw.full_name,
                readme,
                stars: raw.stargazers_count,
                forks: raw.forks_count,
                watchers: raw.watchers_count,
                language: raw.language,
                topics: raw.topics,
                created_at: raw.created_at,
                updated_at: raw.updated_at,
                url: raw.html_url,
            });
        }

        info!(%company, %org, count = records.len(), "fetched repositories");
        Ok(FetchOutcome {
            summary: if records.is_empty() {
                format!("No repositories found for {company}")
            } else {
                format!("Found {} repositories for {company} under {org}", records.len())
            },
            resolved: Some(org),
            records,
        })
    }
}

/// A recently updated repository, as shown in activity summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRepo {
    pub name: String,
    pub stars: u64,
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoActivity {
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub active_last_30d: usize,
    pub recent_activity: String,
    pub activity_level: String,
    pub top_repos: Vec<RepoRecord>,
}

impl RepoActivity {
    pub fn from_repos(repos: &[RepoRecord], now: DateTime<Utc>, window_days: i64) -> Self {
        let mut recent: Vec<(DateTime<Utc>, RecentRepo)> = Vec::new();
        for r in repos {
            match parse_timestamp(&r.updated_at) {
                Some(ts) if is_recent(ts, now, window_days) => recent.push((
                    ts,
                    RecentRepo {
                        name: r.name.clone(),
                        stars: r.stars,
                        updated: ts.format("%Y-%m-%d").to_string(),
                    },
                )),
                Some(_) => {}
                None => warn!(repo = %r.name, updated_at = %r.updated_at, "unparsable repo date"),
            }
        }
        recent.sort_by(|a, b| b.0.cmp(&a.0));

        let recent_activity = if recent.is_empty() {
            "None".to_string()
        } else {
            recent
                .iter()
                .take(3)
                .map(|(_, r)| format!("{} ({}★)", r.name, r.stars))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let activity_level = match recent.len() {
            n if n > 10 => "High",
            n if n > 3 => "Moderate",
            _ => "Low",
        };

        let mut by_stars: Vec<RepoRecord> = repos.to_vec();
        by_stars.sort_by(|a, b| b.stars.cmp(&a.stars));
        by_stars.truncate(5);

        Self {
            total_repos: repos.len(),
            total_stars: repos.iter().map(|r| r.stars).sum(),
            total_forks: repos.iter().map(|r| r.forks).sum(),
            active_last_30d: recent.len(),
            recent_activity,
            activity_level: activity_level.into(),
            top_repos: by_stars,
        }
    }
}

/// The `limit` most-starred repositories, for persistence.
pub fn top_by_stars(repos: &[RepoRecord], limit: usize) -> Vec<RepoRecord> {
    let mut sorted = repos.to_vec();
    sorted.sort_by(|a, b| b.stars.cmp(&a.stars));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn repo(name: &str, stars: u64, updated: DateTime<Utc>) -> RepoRecord {
        RepoRecord {
            name: name.into(),
            full_name: format!("org/{name}"),
            description: String::new(),
            readme: String::new(),
            stars,
            forks: 1,
            watchers: 0,
            language: None,
            topics: vec![],
            created_at: String::new(),
            updated_at: updated.to_rfc3339(),
            url: String::new(),
        }
    }

    #[test]
    fn readme_decodes_wrapped_base64() {
        assert_eq!(decode_readme("SGVs\nbG8=\n").as_deref(), Some("Hello"));
        assert_eq!(decode_readme("!!!"), None);
    }

    #[test]
    fn activity_summarises_recent_repos() {
        let now = Utc::now();
        let repos = vec![
            repo("old", 500, now - Duration::days(90)),
            repo("a", 10, now - Duration::days(1)),
            repo("b", 20, now - Duration::days(2)),
            repo("c", 30, now - Duration::days(3)),
            repo("d", 40, now - Duration::days(4)),
        ];
        let act = RepoActivity::from_repos(&repos, now, 30);
        assert_eq!(act.total_repos, 5);
        assert_eq!(act.total_stars, 600);
        assert_eq!(act.total_forks, 5);
        assert_eq!(act.active_last_30d, 4);
        assert_eq!(act.activity_level, "Moderate");
        assert_eq!(act.recent_activity, "a (10★), b (20★), c (30★)");
        assert_eq!(act.top_repos[0].name, "old");
    }

    #[test]
    fn top_by_stars_keeps_limit() {
        let now = Utc::now();
        let repos: Vec<RepoRecord> = (0..60).map(|i| repo(&format!("r{i}"), i, now)).collect();
        let top = top_by_stars(&repos, 50);
        assert_eq!(top.len(), 50);
        assert_eq!(top[0].stars, 59);
    }
}
