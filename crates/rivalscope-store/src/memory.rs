// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Collection, DocumentStore, Filter, StoreError};

/// Process-local store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(Collection, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(
        &self,
        collection: Collection,
        key: &str,
        document: Value,
    ) -> Result<(), StoreError> {
        self.docs.write().await.insert((collection, key.to_string()), document);
        Ok(())
    }

    async fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|((c, _), doc)| *c == collection && filter.matches(doc))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(&(collection, key.to_string())).cloned())
    }
}
