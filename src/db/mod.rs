//! Database layer: the keyed document store the leaderboard runs against.
//!
//! Components receive an `Arc<dyn DocumentStore>` at construction time, so
//! the Firestore client and the in-memory store are interchangeable.

pub mod firestore;
pub mod memory;
pub mod timeout;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;
pub use timeout::TimeoutStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const WORKOUTS: &str = "workouts";
    /// Aggregated leaderboard snapshots (keyed by user, timeframe and period)
    pub const LEADERBOARD_ENTRIES: &str = "leaderboard_entries";
}

/// Untyped document body.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by a query: its key plus untyped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

/// How a `put` combines with an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Overwrite the whole document.
    Replace,
    /// Overwrite only the written fields, keeping any others.
    MergeFields,
}

/// `field == value` condition for queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityFilter {
    pub field: String,
    pub value: String,
}

impl EqualityFilter {
    pub fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn matches(&self, fields: &Fields) -> bool {
        matches!(fields.get(&self.field), Some(Value::String(v)) if *v == self.value)
    }
}

/// Durable keyed document store.
///
/// Only equality filtering and a hard result limit are assumed. Result
/// order is unspecified; callers needing an order must sort themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `fields` under `key`. When `server_timestamp` names a field, the
    /// store sets it to its own clock at write time.
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &Fields,
        mode: MergeMode,
        server_timestamp: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Return at most `limit` documents matching all `filters`.
    async fn query(
        &self,
        collection: &str,
        filters: &[EqualityFilter],
        limit: u32,
    ) -> Result<Vec<Document>, StoreError>;
}
