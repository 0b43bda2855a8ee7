// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Collection, DocumentStore, Filter, StoreError};

/// Makes temp file names unique across concurrent writes of one key.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One JSON file per document: `{root}/{collection}/{escaped key}.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a half-written document.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    fn document_path(&self, collection: Collection, key: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", escape_key(key)))
    }
}

/// Keep `[A-Za-z0-9_-]`, encode every other byte as `%XX`.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn upsert(
        &self,
        collection: Collection,
        key: &str,
        document: Value,
    ) -> Result<(), StoreError> {
        let dir = self.collection_dir(collection);
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.document_path(collection, key);
        let tmp = dir.join(format!(
            ".{}.{}.{}.tmp",
            escape_key(key),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let bytes = serde_json::to_vec_pretty(&document)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "document written");
        Ok(())
    }

    async fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let dir = self.collection_dir(collection);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(doc) if filter.matches(&doc) => docs.push(doc),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
            }
        }
        Ok(docs)
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError> {
        match tokio::fs::read(self.document_path(collection, key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
