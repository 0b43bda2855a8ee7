// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use rivalscope_config::ToolsConfig;
use rivalscope_sources::{FetchOutcome, SourceClient, SourceError};
use rivalscope_store::{persist_all, DocumentStore, Filter, Stamped, StoreRecord};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Everything the intelligence tools need, shared between them.
pub struct ToolContext {
    pub sources: SourceClient,
    pub store: Arc<dyn DocumentStore>,
    pub cfg: ToolsConfig,
}

impl ToolContext {
    pub fn new(sources: SourceClient, store: Arc<dyn DocumentStore>, cfg: ToolsConfig) -> Self {
        Self { sources, store, cfg }
    }

    /// Stored documents for `company`.  Documents that no longer match the
    /// record shape are skipped.
    pub(crate) async fn stored<R>(&self, company: &str) -> anyhow::Result<Vec<Stamped<R>>>
    where
        R: StoreRecord + DeserializeOwned,
    {
        let docs = self.store.query(R::COLLECTION, &Filter::company(company)).await?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<Stamped<R>>(doc) {
                Ok(rec) => out.push(rec),
                Err(e) => warn!(collection = %R::COLLECTION, error = %e, "skipping malformed document"),
            }
        }
        Ok(out)
    }

    /// Persist a live fetch.  Returns the failure message if the fetch failed.
    #[must_use]
    pub(crate) async fn persist_fetch<R: StoreRecord>(
        &self,
        company: &str,
        fetched: Result<FetchOutcome<R>, SourceError>,
    ) -> Option<String> {
        match fetched {
            Ok(outcome) => {
                let written = persist_all(self.store.as_ref(), company, &outcome.records).await;
                info!(
                    collection = %R::COLLECTION,
                    %company,
                    written = written.written,
                    failed = written.failed,
                    "refreshed store from live source"
                );
                None
            }
            Err(e) => {
                warn!(collection = %R::COLLECTION, %company, error = %e, "live refresh failed");
                Some(e.to_string())
            }
        }
    }
}

/// Summary for an empty result whose live refresh failed upstream.
pub(crate) fn unavailable_summary(source: &str, company: &str, reason: &str) -> String {
    let reason: String = reason.chars().take(100).collect();
    format!(
        "{source} data for {company} is temporarily unavailable ({reason}). \
         Analysis will focus on the other sources."
    )
}
