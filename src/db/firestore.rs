// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper.
//!
//! Provides:
//! - The generic [`DocumentStore`] used for leaderboard entries
//! - Workout and profile reads for the leaderboard pipeline

use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreTransformServerValue;
use serde_json::Value;

use crate::db::{collections, Document, DocumentStore, EqualityFilter, Fields, MergeMode};
use crate::error::StoreError;
use crate::models::{UserProfile, WorkoutRecord};
use crate::services::sources::{ProfileSource, WorkoutSource};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // Emulator runs unauthenticated; skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Permanent(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Permanent(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Permanent("Database not connected (offline mode)".to_string()))
    }
}

/// Classify a Firestore failure as retryable or not.
fn map_firestore_error(err: FirestoreError) -> StoreError {
    match &err {
        FirestoreError::NetworkError(_) => StoreError::Transient(err.to_string()),
        FirestoreError::DatabaseError(db_err) if db_err.retry_possible => {
            StoreError::Transient(err.to_string())
        }
        _ => StoreError::Permanent(err.to_string()),
    }
}

/// Document id is the last segment of the full resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: &Fields,
        mode: MergeMode,
        server_timestamp: Option<&str>,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let body = Value::Object(fields.clone());

        let update = client.fluent().update();
        let update = match mode {
            MergeMode::MergeFields => update.fields(fields.keys().cloned().collect::<Vec<_>>()),
            MergeMode::Replace => update,
        };

        let update = update.in_col(collection).document_id(key);
        let update = match server_timestamp {
            Some(field) => update.transforms(|t| {
                t.fields([t
                    .field(field)
                    .server_value(FirestoreTransformServerValue::RequestTime)])
            }),
            None => update,
        };

        let _: () = update
            .object(&body)
            .execute()
            .await
            .map_err(map_firestore_error)?;

        tracing::debug!(collection, key, ?mode, "Document written");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[EqualityFilter],
        limit: u32,
    ) -> Result<Vec<Document>, StoreError> {
        let filters = filters.to_vec();

        let raw_docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                let conditions: Vec<_> = filters
                    .iter()
                    .map(|f| q.field(f.field.as_str()).eq(f.value.clone()))
                    .collect();
                q.for_all(conditions)
            })
            .limit(limit)
            .query()
            .await
            .map_err(map_firestore_error)?;

        let mut docs = Vec::with_capacity(raw_docs.len());
        for raw in &raw_docs {
            let key = document_id(&raw.name).to_string();
            match firestore::FirestoreDb::deserialize_doc_to::<Value>(raw) {
                Ok(Value::Object(fields)) => docs.push(Document { key, fields }),
                Ok(_) => tracing::warn!(collection, key, "Document body is not a map, skipping"),
                Err(e) => {
                    tracing::warn!(collection, key, error = %e, "Undecodable document, skipping")
                }
            }
        }

        Ok(docs)
    }
}

#[async_trait]
impl WorkoutSource for FirestoreDb {
    async fn workouts_for_user(&self, user_id: &str) -> Result<Vec<WorkoutRecord>, StoreError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj::<WorkoutRecord>()
            .query()
            .await
            .map_err(map_firestore_error)
    }
}

#[async_trait]
impl ProfileSource for FirestoreDb {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(map_firestore_error)
    }
}
