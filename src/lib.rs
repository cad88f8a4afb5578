// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness leaderboard: time-windowed competitive rankings built from
//! per-user workout activity.
//!
//! Workouts are rolled up into weekly, monthly, yearly and all-time
//! snapshots, synced to a document store, and served back as ranked
//! leaderboards and per-user rank lookups.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{LeaderboardService, ProfileSource, WorkoutSource};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub leaderboard: LeaderboardService,
    pub workouts: Arc<dyn WorkoutSource>,
    pub profiles: Arc<dyn ProfileSource>,
}
