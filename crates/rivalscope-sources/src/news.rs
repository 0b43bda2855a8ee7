// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Google News RSS fetcher.

use chrono::{Duration, SecondsFormat, Utc};
use html2text::render::text_renderer::TrivialDecorator;
use rivalscope_store::{Collection, StoreRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::recency::parse_feed_date;
use crate::sentiment::{classify, Sentiment};
use crate::{top_counts, truncate_chars, FetchOutcome, NameCount, SourceClient, SourceError};

const SNIPPET_LIMIT: usize = 300;
const CONTENT_LIMIT: usize = 2000;
/// Wide enough that html2text never wraps a description.
const TEXT_WIDTH: usize = 10_000;
/// Upper bound on the news window; larger requests are clamped.
pub const MAX_DAYS_BACK: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub title: String,
    pub source: String,
    pub url: String,
    /// RFC 3339, UTC
    pub published_date: String,
    pub snippet: String,
    pub content: String,
    pub sentiment: Sentiment,
}

impl StoreRecord for NewsRecord {
    const COLLECTION: Collection = Collection::News;

    /// SHA-256 of the article URL.
    fn natural_id(&self) -> String {
        hex::encode(Sha256::digest(self.url.as_bytes()))
    }
}

// ─── RSS wire format ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Deserialize)]
struct ItemSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

/// Publisher name: the `<source>` element, else the title suffix after the
/// last `" - "`, else `Unknown`.
fn source_name(source: Option<&str>, title: &str) -> String {
    if let Some(s) = source.map(str::trim).filter(|s| !s.is_empty()) {
        return s.to_string();
    }
    match title.rsplit_once(" - ") {
        Some((_, suffix)) if !suffix.trim().is_empty() => suffix.trim().to_string(),
        _ => "Unknown".into(),
    }
}

/// Plain text of a feed description: markup dropped, entities decoded,
/// whitespace collapsed.
fn html_to_text(html: &str) -> String {
    let text = html2text::from_read_with_decorator(html.as_bytes(), TEXT_WIDTH, TrivialDecorator::new());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl SourceClient {
    /// Articles about `company` published within the last `days_back` days
    /// (clamped to `0..=MAX_DAYS_BACK`).
    pub async fn fetch_news(
        &self,
        company: &str,
        days_back: i64,
    ) -> Result<FetchOutcome<NewsRecord>, SourceError> {
        let url = self.cfg.news_rss_url.clone();
        debug!(%url, %company, "fetching news feed");
        let resp = self
            .http
            .get(&url)
            .query(&[("q", company), ("hl", "en"), ("gl", "US"), ("ceid", "US:en")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::UpstreamStatus { url, status: status.as_u16() });
        }
        let body = resp.text().await?;
        let feed: Rss = quick_xml::de::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;

        let cutoff = Utc::now() - Duration::days(days_back.clamp(0, MAX_DAYS_BACK));
        let mut records = Vec::new();
        for item in feed.channel.items.into_iter().take(self.cfg.max_news_entries) {
            let title = item.title.unwrap_or_default();
            let raw_date = item.pub_date.unwrap_or_default();
            let Some(published) = parse_feed_date(&raw_date) else {
                warn!(%title, pub_date = %raw_date, "skipping article with unparsable date");
                continue;
            };
            if published < cutoff {
                continue;
            }
            let summary = html_to_text(item.description.as_deref().unwrap_or_default());
            records.push(NewsRecord {
                source: source_name(item.source.as_ref().and_then(|s| s.name.as_deref()), &title),
                url: item.link.unwrap_or_default(),
                published_date: published.to_rfc3339_opts(SecondsFormat::Secs, true),
                snippet: truncate_chars(&summary, SNIPPET_LIMIT),
                content: truncate_chars(&summary, CONTENT_LIMIT),
                sentiment: classify(&title, &summary),
                title,
            });
        }

        info!(%company, count = records.len(), "fetched recent news");
        Ok(FetchOutcome {
            resolved: Some(company.to_string()),
            summary: if records.is_empty() {
                format!("No recent news found for {company}")
            } else {
                format!("Found {} recent articles about {company}", records.len())
            },
            records,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsInsights {
    pub summary: String,
    pub sentiment_breakdown: SentimentBreakdown,
    pub top_sources: Vec<NameCount>,
}

impl NewsInsights {
    pub fn from_articles(company: &str, articles: &[NewsRecord]) -> Self {
        let mut breakdown = SentimentBreakdown::default();
        for a in articles {
            match a.sentiment {
                Sentiment::Positive => breakdown.positive += 1,
                Sentiment::Negative => breakdown.negative += 1,
                Sentiment::Neutral => breakdown.neutral += 1,
            }
        }
        Self {
            summary: if articles.is_empty() {
                format!("No recent news found for {company}")
            } else {
                format!("Found {} recent articles about {company}", articles.len())
            },
            sentiment_breakdown: breakdown,
            top_sources: top_counts(articles.iter().map(|a| a.source.as_str()), 5),
        }
    }
}
