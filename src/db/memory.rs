// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store for tests and local development.
//!
//! Documents are returned in key order, which has nothing to do with any
//! leaderboard metric, and the limit is applied before anything else sees
//! them. That matches what the real store guarantees.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::db::{Document, DocumentStore, EqualityFilter, Fields, MergeMode};
use crate::error::StoreError;
use crate::time_utils::format_utc_rfc3339;

/// In-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Fields>>,
    /// Fixed server clock; `None` uses the wall clock.
    fixed_time: Option<DateTime<Utc>>,
    /// Error returned by the next call instead of touching the data.
    next_failure: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose server clock always reads `time`.
    pub fn with_fixed_time(time: DateTime<Utc>) -> Self {
        Self {
            fixed_time: Some(time),
            ..Self::default()
        }
    }

    /// Make the next `put` or `query` fail with `err`.
    pub fn fail_next(&self, err: StoreError) {
        if let Ok(mut slot) = self.next_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Insert raw fields, bypassing `put` semantics.
    pub fn insert_raw(&self, collection: &str, key: &str, fields: Fields) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);
    }

    /// Read one document.
    pub fn get(&self, collection: &str, key: &str) -> Option<Fields> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(key).cloned())
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |docs| docs.len())
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_time.unwrap_or_else(Utc::now)
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        match self.next_failure.lock() {
            Ok(mut slot) => slot.take().map_or(Ok(()), Err),
            Err(_) => Err(StoreError::Permanent("memory store poisoned".to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &Fields,
        mode: MergeMode,
        server_timestamp: Option<&str>,
    ) -> Result<(), StoreError> {
        self.take_failure()?;

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        let doc = docs.entry(key.to_string()).or_default();

        if mode == MergeMode::Replace {
            doc.clear();
        }
        for (name, value) in fields {
            doc.insert(name.clone(), value.clone());
        }
        if let Some(name) = server_timestamp {
            doc.insert(name.to_string(), Value::String(format_utc_rfc3339(self.now())));
        }

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[EqualityFilter],
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        self.take_failure()?;

        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, fields)| filters.iter().all(|f| f.matches(fields)))
            .take(limit as usize)
            .map(|(key, fields)| Document {
                key: key.clone(),
                fields: fields.clone(),
            })
            .collect())
    }
}
