// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Document persistence for scraped records.
//!
//! Records are upserted by a deterministic natural key and never deleted.
//! Two backends share the [`DocumentStore`] trait: a directory of JSON files
//! and a process-local map.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rivalscope_config::{StoreBackend, StoreConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Patents,
    Jobs,
    News,
    Github,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patents => "patents",
            Self::Jobs => "jobs",
            Self::News => "news",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter over the `company` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    company: Option<String>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn company(company: &str) -> Self {
        Self { company: Some(normalize_company(company)) }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match &self.company {
            None => true,
            Some(c) => doc.get("company").and_then(Value::as_str) == Some(c.as_str()),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or fully replace the document stored under `key`.
    async fn upsert(&self, collection: Collection, key: &str, document: Value)
        -> Result<(), StoreError>;

    /// All documents in `collection` accepted by `filter`, in no particular order.
    async fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError>;
}

/// Open the backend selected in configuration.
pub fn open(cfg: &StoreConfig) -> Arc<dyn DocumentStore> {
    match cfg.backend {
        StoreBackend::Fs => Arc::new(FsStore::new(cfg.root.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}

/// Lowercased, trimmed company name used in keys and the `company` field.
pub fn normalize_company(company: &str) -> String {
    company.trim().to_lowercase()
}

pub fn natural_key(company: &str, id: &str) -> String {
    format!("{}_{}", normalize_company(company), id)
}

/// A source record that knows where it lives in the store.
pub trait StoreRecord: Serialize + Send + Sync {
    const COLLECTION: Collection;

    /// Source-specific identifier, unique within a company.
    fn natural_id(&self) -> String;
}

/// Persisted envelope: the record's own fields plus `company` and `scraped_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<R> {
    pub company: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: R,
}

impl<R> Stamped<R> {
    pub fn new(company: &str, record: R) -> Self {
        Self { company: normalize_company(company), scraped_at: Utc::now(), record }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub written: usize,
    pub failed: usize,
}

/// Upsert every record, logging and counting failures instead of aborting.
pub async fn persist_all<R: StoreRecord>(
    store: &dyn DocumentStore,
    company: &str,
    records: &[R],
) -> PersistSummary {
    let mut summary = PersistSummary::default();
    for record in records {
        let key = natural_key(company, &record.natural_id());
        let doc = match serde_json::to_value(Stamped::new(company, record)) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(collection = %R::COLLECTION, %key, error = %e, "could not serialise record");
                summary.failed += 1;
                continue;
            }
        };
        match store.upsert(R::COLLECTION, &key, doc).await {
            Ok(()) => summary.written += 1,
            Err(e) => {
                warn!(collection = %R::COLLECTION, %key, error = %e, "upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
