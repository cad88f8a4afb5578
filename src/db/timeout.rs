// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller-level timeout around every store call.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::db::{Document, DocumentStore, EqualityFilter, Fields, MergeMode};
use crate::error::StoreError;

/// Wraps a store so each call fails with [`StoreError::Transient`] once it
/// runs longer than the configured duration.
pub struct TimeoutStore {
    inner: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Transient(format!(
                "store {} timed out after {}ms",
                op,
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for TimeoutStore {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &Fields,
        mode: MergeMode,
        server_timestamp: Option<&str>,
    ) -> Result<(), StoreError> {
        self.bounded(
            "put",
            self.inner
                .put(collection, key, fields, mode, server_timestamp),
        )
        .await
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[EqualityFilter],
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        self.bounded("query", self.inner.query(collection, filters, limit))
            .await
    }
}
