// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout record model, as supplied by the workout data source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finalized workout. Read-only to the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Workout ID (also used as document ID)
    pub id: String,
    /// Owner
    pub user_id: String,
    /// When the workout took place
    pub timestamp: DateTime<Utc>,
    pub steps: u64,
    #[serde(default)]
    pub floors: u32,
    /// Duration in seconds
    pub duration_secs: u64,
    /// Steps per minute as recorded by the device
    #[serde(default)]
    pub pace: Option<f64>,
}
