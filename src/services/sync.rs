// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upsert sync writer.
//!
//! Each sync is exactly one store write that replaces the entry's full
//! metric set under its composite key, so repeating it is harmless. The
//! `lastUpdated` field is stamped by the store, never by this process.
//! Failures are returned as-is; retrying is the caller's decision.

use futures_util::{stream, StreamExt};
use std::sync::Arc;

use crate::db::{collections, DocumentStore, MergeMode};
use crate::error::StoreError;
use crate::models::leaderboard::fields;
use crate::models::LeaderboardEntry;

const MAX_CONCURRENT_SYNCS: usize = 8;

/// Persists leaderboard snapshots.
#[derive(Clone)]
pub struct SyncWriter {
    store: Arc<dyn DocumentStore>,
}

impl SyncWriter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write one snapshot. A single attempt.
    pub async fn sync(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        self.store
            .put(
                collections::LEADERBOARD_ENTRIES,
                &entry.document_key(),
                &entry.to_fields(),
                MergeMode::MergeFields,
                Some(fields::LAST_UPDATED),
            )
            .await
    }

    /// Write several snapshots concurrently.
    ///
    /// Every write is attempted even if some fail; the first error (in
    /// input order) is returned.
    pub async fn sync_all(&self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        let syncs: Vec<_> = entries.iter().map(|entry| self.sync(entry)).collect();
        let results: Vec<Result<(), StoreError>> = stream::iter(syncs)
            .buffered(MAX_CONCURRENT_SYNCS)
            .collect()
            .await;

        results.into_iter().collect()
    }
}
