// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod leaderboard;
pub mod user;
pub mod workout;

pub use leaderboard::{
    LeaderboardEntry, Metric, PeriodKey, RankResult, StatsMetrics, Timeframe,
};
pub use user::UserProfile;
pub use workout::WorkoutRecord;
