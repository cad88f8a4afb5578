// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the leaderboard core and its HTTP surface.
//!
//! The core components return [`StoreError`], [`ValidationError`] or the
//! combined [`LeaderboardError`] unmodified. Only [`AppError`] logs, when it
//! is turned into a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure talking to the durable document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network failure or timeout. The caller may retry.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Authorization denial, quota exhaustion and similar. Retrying without
    /// outside intervention will fail the same way.
    #[error("Permanent store error: {0}")]
    Permanent(String),
}

impl StoreError {
    /// Whether the failed call may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Input or stored data that does not match the leaderboard schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("Invalid period for {timeframe}: {period}")]
    InvalidPeriod { timeframe: String, period: String },

    #[error("Invalid limit: {0}")]
    InvalidLimit(u32),

    #[error("Malformed document {key}: {reason}")]
    MalformedDocument { key: String, reason: String },
}

impl ValidationError {
    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        ValidationError::MalformedDocument {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error returned by the public leaderboard operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeaderboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<LeaderboardError> for AppError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::Validation(e) => e.into(),
            LeaderboardError::Store(e) => AppError::Store(e),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Store(StoreError::Transient(msg)) => {
                tracing::warn!(error = %msg, "Transient store error");
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", None)
            }
            AppError::Store(StoreError::Permanent(msg)) => {
                tracing::error!(error = %msg, "Permanent store error");
                (StatusCode::BAD_GATEWAY, "store_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
