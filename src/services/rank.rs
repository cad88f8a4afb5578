// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rank lookup for a single user.
//!
//! Reuses the query engine's ordering over the capped candidate set.
//!
//! # Limitation
//!
//! Ranks are only as complete as the candidate cap. A user who has an entry
//! in the store but falls outside the fetched candidates is reported as not
//! ranked (`None`), exactly like a user with no entry at all. Callers
//! should present `None` as "not ranked", never as an error.
//!
//! Zero-workout entries left behind by emptied periods are dropped only
//! after the store has applied the cap, so they still occupy candidate
//! slots. The effective window is the cap minus those entries.

use crate::error::StoreError;
use crate::models::{LeaderboardEntry, Metric, RankResult, Timeframe};
use crate::services::query::QueryEngine;

/// Position of `user_id` within already-ranked `entries`.
pub fn position_of(entries: &[LeaderboardEntry], user_id: &str) -> Option<RankResult> {
    let index = entries.iter().position(|e| e.user_id == user_id)?;
    Some(RankResult {
        rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
        total: u32::try_from(entries.len()).unwrap_or(u32::MAX),
    })
}

/// Resolves a user's rank on a leaderboard.
#[derive(Clone)]
pub struct RankResolver {
    engine: QueryEngine,
}

impl RankResolver {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// `Some((rank, total))`, or `None` if the user is not among the
    /// candidates.
    pub async fn rank(
        &self,
        user_id: &str,
        metric: Metric,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<Option<RankResult>, StoreError> {
        let list = self.engine.ranked(metric, timeframe, period).await?;
        Ok(position_of(&list.entries, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::StatsMetrics;
    use crate::services::sync::SyncWriter;
    use std::sync::Arc;

    fn entry(user_id: &str, steps: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            photo_url: None,
            timeframe: Timeframe::Monthly,
            period: "2025-10".to_string(),
            metrics: StatsMetrics::from_totals(steps, 1, 600),
            last_updated: None,
        }
    }

    fn entry_with_workouts(user_id: &str, steps: u64, workouts: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            metrics: StatsMetrics::from_totals(steps, workouts, 0),
            ..entry(user_id, steps)
        }
    }

    async fn resolver(entries: &[LeaderboardEntry], cap: u32) -> RankResolver {
        let store = Arc::new(MemoryStore::new());
        SyncWriter::new(store.clone()).sync_all(entries).await.unwrap();
        RankResolver::new(QueryEngine::new(store, cap))
    }

    #[tokio::test]
    async fn test_rank_counts_strictly_greater_plus_tiebreak() {
        let r = resolver(&[entry("A", 500), entry("B", 800), entry("C", 800)], 1000).await;

        let rank = |u: &'static str| {
            let r = r.clone();
            async move {
                r.rank(u, Metric::Steps, Timeframe::Monthly, "2025-10")
                    .await
                    .unwrap()
            }
        };

        assert_eq!(rank("B").await, Some(RankResult { rank: 1, total: 3 }));
        assert_eq!(rank("C").await, Some(RankResult { rank: 2, total: 3 }));
        assert_eq!(rank("A").await, Some(RankResult { rank: 3, total: 3 }));
    }

    #[tokio::test]
    async fn test_absent_user_is_not_ranked() {
        let r = resolver(&[entry("A", 500)], 1000).await;
        let result = r
            .rank("nobody", Metric::Steps, Timeframe::Monthly, "2025-10")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_user_outside_candidate_cap_is_not_ranked() {
        // Key order puts "z" last, beyond a cap of two.
        let r = resolver(&[entry("a", 1), entry("b", 2), entry("z", 3)], 2).await;
        let result = r
            .rank("z", Metric::Steps, Timeframe::Monthly, "2025-10")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_emptied_entries_use_up_candidate_slots() {
        // "a" is fetched within the cap of two, then dropped for having no
        // workouts, which leaves "z" outside the window.
        let r = resolver(&[entry_with_workouts("a", 0, 0), entry("b", 2), entry("z", 3)], 2).await;

        let z = r
            .rank("z", Metric::Steps, Timeframe::Monthly, "2025-10")
            .await
            .unwrap();
        assert_eq!(z, None);

        let b = r
            .rank("b", Metric::Steps, Timeframe::Monthly, "2025-10")
            .await
            .unwrap();
        assert_eq!(b, Some(RankResult { rank: 1, total: 1 }));
    }

    #[test]
    fn test_position_of_empty() {
        assert_eq!(position_of(&[], "a"), None);
    }
}
