// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collaborators the leaderboard reads from but does not own.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{UserProfile, WorkoutRecord};

/// Supplies a user's finalized workouts.
#[async_trait]
pub trait WorkoutSource: Send + Sync {
    /// The full authoritative workout set for the user.
    async fn workouts_for_user(&self, user_id: &str) -> Result<Vec<WorkoutRecord>, StoreError>;
}

/// Supplies the display name and photo embedded into entries.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
}
