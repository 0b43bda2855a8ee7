// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Google Patents search fetcher.

use rivalscope_store::{Collection, StoreRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::resolve::patent_assignee;
use crate::{truncate_chars, FetchOutcome, SourceClient, SourceError};

const TITLE_LIMIT: usize = 200;
const ABSTRACT_LIMIT: usize = 400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub patent_number: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publication_date: String,
    pub filing_date: String,
    pub grant_date: String,
    pub assignee: String,
    pub inventors: Vec<String>,
    pub url: String,
    pub source: String,
}

impl StoreRecord for PatentRecord {
    const COLLECTION: Collection = Collection::Patents;

    fn natural_id(&self) -> String {
        self.patent_number.clone()
    }
}

fn encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn str_field(v: &Value, key: &str) -> String {
    v[key].as_str().unwrap_or_default().trim().to_string()
}

/// One search hit, or `None` if it has no title.
fn parse_result(result: &Value, fallback_assignee: &str) -> Option<PatentRecord> {
    let patent = &result["patent"];
    let title = str_field(patent, "title");
    if title.is_empty() {
        return None;
    }
    let id = result["id"].as_str().unwrap_or_default();
    let inventors = match &patent["inventor"] {
        Value::String(s) => s.split(',').map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect(),
        Value::Array(items) => items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    };
    let assignee = match str_field(patent, "assignee") {
        a if a.is_empty() => fallback_assignee.to_string(),
        a => a,
    };
    Some(PatentRecord {
        patent_number: id.replace("patent/", "").replace("/en", ""),
        title: truncate_chars(&title, TITLE_LIMIT),
        abstract_text: truncate_chars(&str_field(patent, "snippet"), ABSTRACT_LIMIT),
        publication_date: str_field(patent, "publication_date"),
        filing_date: str_field(patent, "filing_date"),
        grant_date: str_field(patent, "grant_date"),
        assignee,
        inventors,
        url: format!("https://patents.google.com/{id}"),
        source: "Google Patents".into(),
    })
}

impl SourceClient {
    /// Up to `limit` patents assigned to, or mentioning, the company.
    pub async fn fetch_patents(
        &self,
        company: &str,
        limit: usize,
    ) -> Result<FetchOutcome<PatentRecord>, SourceError> {
        let query = patent_assignee(company);
        let inner = format!("q={}&assignee={}", encode(&query), encode(&query));
        let url = format!(
            "{}/xhr/query?url={}",
            self.cfg.patents_base_url.trim_end_matches('/'),
            encode(&inner)
        );
        debug!(%url, "searching patents");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::UpstreamStatus { url, status: status.as_u16() });
        }
        let body: Value = resp.json().await.map_err(|e| SourceError::Decode(e.to_string()))?;

        let mut records = Vec::new();
        let clusters = body["results"]["cluster"].as_array().map(Vec::as_slice).unwrap_or_default();
        'outer: for cluster in clusters {
            for result in cluster["result"].as_array().map(Vec::as_slice).unwrap_or_default() {
                if records.len() >= limit {
                    break 'outer;
                }
                if let Some(rec) = parse_result(result, &query) {
                    records.push(rec);
                }
            }
        }

        info!(%company, %query, count = records.len(), "fetched patents");
        let summary = match records.first() {
            None => format!(
                "No patents found for '{company}'. Patents may be filed under a different \
                 assignee name (e.g. '{company} Inc', '{company} LLC') or the company may be \
                 too new. Proceed with analysis using jobs, news and GitHub data."
            ),
            Some(first) => format!(
                "Found {} patents for {company}. Most recent: '{}'",
                records.len(),
                truncate_chars(&first.title, 60)
            ),
        };
        Ok(FetchOutcome { resolved: Some(query), records, summary })
    }
}
