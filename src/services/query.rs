// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard query engine.
//!
//! The store can filter by timeframe and period but cannot sort by an
//! arbitrary metric. A store-side limit applied before sorting would
//! return an arbitrary subset, not the top N, so the engine always fetches
//! up to the candidate cap, sorts in process and only then truncates.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::db::{collections, DocumentStore, EqualityFilter};
use crate::error::{StoreError, ValidationError};
use crate::models::leaderboard::fields;
use crate::models::{LeaderboardEntry, Metric, Timeframe};

/// Default bound on how many entries are fetched per query.
pub const DEFAULT_CANDIDATE_CAP: u32 = 1000;

/// Entries ordered for one metric, from a single store snapshot.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    pub entries: Vec<LeaderboardEntry>,
    /// Documents excluded because they failed schema validation.
    pub rejected: Vec<ValidationError>,
}

/// Descending by metric value, then ascending by user id.
///
/// Integer totals compare exactly. An undefined pace (no duration) ranks
/// below every defined one.
pub fn compare_entries(metric: Metric, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    let (x, y) = (&a.metrics, &b.metrics);
    let by_value = match metric {
        Metric::Steps => y.total_steps.cmp(&x.total_steps),
        Metric::Workouts => y.total_workouts.cmp(&x.total_workouts),
        Metric::Duration => y.total_duration_secs.cmp(&x.total_duration_secs),
        Metric::Pace => match (x.average_steps_per_minute, y.average_steps_per_minute) {
            (Some(p), Some(q)) => q.total_cmp(&p),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    by_value.then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sort entries into leaderboard order for `metric`.
pub fn rank_entries(entries: &mut [LeaderboardEntry], metric: Metric) {
    entries.sort_by(|a, b| compare_entries(metric, a, b));
}

/// Reads and ranks leaderboard entries.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn DocumentStore>,
    candidate_cap: u32,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn DocumentStore>, candidate_cap: u32) -> Self {
        Self {
            store,
            candidate_cap: candidate_cap.max(1),
        }
    }

    pub fn candidate_cap(&self) -> u32 {
        self.candidate_cap
    }

    /// Every valid entry for the period, up to the candidate cap, ranked.
    ///
    /// Malformed documents are reported in `rejected` and left out.
    /// Zero-workout entries (a period whose workouts were all removed or
    /// moved) are not competing and are left out too.
    pub async fn ranked(
        &self,
        metric: Metric,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<RankedList, StoreError> {
        let filters = [
            EqualityFilter::new(fields::TIMEFRAME, timeframe.as_str()),
            EqualityFilter::new(fields::PERIOD, period),
        ];

        let docs = self
            .store
            .query(collections::LEADERBOARD_ENTRIES, &filters, self.candidate_cap)
            .await?;

        let mut list = RankedList::default();
        for doc in &docs {
            match LeaderboardEntry::from_document(doc) {
                Ok(entry) if entry.timeframe != timeframe || entry.period != period => {
                    list.rejected.push(ValidationError::malformed(
                        &doc.key,
                        "document does not belong to the requested period",
                    ));
                }
                Ok(entry) if entry.metrics.total_workouts == 0 => {}
                Ok(entry) => list.entries.push(entry),
                Err(e) => list.rejected.push(e),
            }
        }

        rank_entries(&mut list.entries, metric);
        Ok(list)
    }

    /// The top `limit` entries for the period. The limit is applied after
    /// sorting by `metric`.
    pub async fn top(
        &self,
        metric: Metric,
        timeframe: Timeframe,
        period: &str,
        limit: u32,
    ) -> Result<RankedList, StoreError> {
        let mut list = self.ranked(metric, timeframe, period).await?;
        list.entries.truncate(limit as usize);
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::StatsMetrics;
    use crate::services::sync::SyncWriter;
    use serde_json::json;

    fn entry(user_id: &str, steps: u64, workouts: u32, duration_secs: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            photo_url: None,
            timeframe: Timeframe::Weekly,
            period: "2025-W40".to_string(),
            metrics: StatsMetrics::from_totals(steps, workouts, duration_secs),
            last_updated: None,
        }
    }

    async fn seeded(entries: &[LeaderboardEntry]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        SyncWriter::new(store.clone()).sync_all(entries).await.unwrap();
        store
    }

    fn ids(list: &RankedList) -> Vec<&str> {
        list.entries.iter().map(|e| e.user_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_orders_by_metric_with_user_id_tiebreak() {
        let store = seeded(&[
            entry("A", 500, 1, 600),
            entry("C", 800, 1, 600),
            entry("B", 800, 1, 600),
        ])
        .await;
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let list = engine.top(Metric::Steps, Timeframe::Weekly, "2025-W40", 10).await.unwrap();
        assert_eq!(ids(&list), vec!["B", "C", "A"]);

        let again = engine.top(Metric::Steps, Timeframe::Weekly, "2025-W40", 10).await.unwrap();
        assert_eq!(ids(&list), ids(&again));
    }

    #[tokio::test]
    async fn test_limit_applies_after_sort() {
        // Key order in the store is a, b, c, d, e; the best are at the end.
        let store = seeded(&[
            entry("a", 1, 1, 60),
            entry("b", 2, 1, 60),
            entry("c", 3, 1, 60),
            entry("d", 40, 1, 60),
            entry("e", 50, 1, 60),
        ])
        .await;
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let list = engine.top(Metric::Steps, Timeframe::Weekly, "2025-W40", 2).await.unwrap();
        assert_eq!(ids(&list), vec!["e", "d"]);
    }

    #[tokio::test]
    async fn test_each_metric_uses_its_own_field() {
        let store = seeded(&[
            entry("steps", 9000, 1, 6000),
            entry("workouts", 100, 9, 60),
            entry("duration", 100, 1, 90000),
            entry("pace", 5000, 1, 60),
        ])
        .await;
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        for (metric, leader) in [
            (Metric::Steps, "steps"),
            (Metric::Workouts, "workouts"),
            (Metric::Duration, "duration"),
            (Metric::Pace, "pace"),
        ] {
            let list = engine.top(metric, Timeframe::Weekly, "2025-W40", 1).await.unwrap();
            assert_eq!(ids(&list), vec![leader], "metric {metric}");
        }
    }

    #[test]
    fn test_large_totals_compare_exactly() {
        // 2^53 and 2^53 + 1 are the same f64.
        let big = 1u64 << 53;
        let mut entries = vec![entry("a", big, 1, 60), entry("b", big + 1, 1, 60)];
        rank_entries(&mut entries, Metric::Steps);
        assert_eq!(entries[0].user_id, "b");

        let mut entries = vec![entry("a", 1, 1, big), entry("b", 1, 1, big + 1)];
        rank_entries(&mut entries, Metric::Duration);
        assert_eq!(entries[0].user_id, "b");
    }

    #[tokio::test]
    async fn test_undefined_pace_ranks_last() {
        let store = seeded(&[entry("a", 100, 1, 0), entry("b", 10, 1, 600)]).await;
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let list = engine.top(Metric::Pace, Timeframe::Weekly, "2025-W40", 10).await.unwrap();
        assert_eq!(ids(&list), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let store = seeded(&[entry("good", 100, 1, 60)]).await;
        store.insert_raw(
            collections::LEADERBOARD_ENTRIES,
            "broken",
            match json!({"timeframe": "weekly", "period": "2025-W40", "userId": 7}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        );
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let list = engine.top(Metric::Steps, Timeframe::Weekly, "2025-W40", 10).await.unwrap();
        assert_eq!(ids(&list), vec!["good"]);
        assert_eq!(list.rejected.len(), 1);
        assert!(matches!(
            &list.rejected[0],
            ValidationError::MalformedDocument { key, .. } if key == "broken"
        ));
    }

    #[tokio::test]
    async fn test_other_periods_and_empty_entries_excluded() {
        let mut other = entry("other", 999, 1, 60);
        other.period = "2025-W41".to_string();
        let store = seeded(&[entry("here", 1, 1, 60), entry("idle", 0, 0, 0), other]).await;
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let list = engine.ranked(Metric::Steps, Timeframe::Weekly, "2025-W40").await.unwrap();
        assert_eq!(ids(&list), vec!["here"]);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(StoreError::Transient("deadline exceeded".to_string()));
        let engine = QueryEngine::new(store, DEFAULT_CANDIDATE_CAP);

        let err = engine
            .top(Metric::Steps, Timeframe::Weekly, "2025-W40", 10)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_compare_is_total_and_deterministic() {
        let mut entries = vec![
            entry("z", 5, 1, 60),
            entry("m", 5, 1, 60),
            entry("a", 5, 1, 60),
            entry("q", 7, 1, 60),
        ];
        rank_entries(&mut entries, Metric::Steps);
        let order: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["q", "a", "m", "z"]);
    }
}
