// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - leaderboard logic.

pub mod aggregator;
pub mod leaderboard;
pub mod period;
pub mod query;
pub mod rank;
pub mod sources;
pub mod sync;

pub use leaderboard::{LeaderboardService, LeaderboardSettings};
pub use query::{QueryEngine, RankedList};
pub use rank::RankResolver;
pub use sources::{ProfileSource, WorkoutSource};
pub use sync::SyncWriter;
