// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard service: the operations exposed to the UI layer.
//!
//! Handles the workflow:
//! 1. Workout created, edited or deleted
//! 2. Recompute the affected period buckets from the full workout set
//! 3. Sync each snapshot to the store
//! 4. Serve ranked leaderboards and rank lookups for the current period
//!
//! Every store call made through this service is bounded by the configured
//! timeout and surfaces as a transient error when it expires.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::{DocumentStore, TimeoutStore};
use crate::error::{LeaderboardError, StoreError, ValidationError};
use crate::models::{
    LeaderboardEntry, Metric, RankResult, StatsMetrics, Timeframe, UserProfile, WorkoutRecord,
};
use crate::services::aggregator;
use crate::services::period::{period_identifier, validate_period};
use crate::services::query::{QueryEngine, DEFAULT_CANDIDATE_CAP};
use crate::services::rank::RankResolver;
use crate::services::sync::SyncWriter;

/// Tunables for [`LeaderboardService`].
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardSettings {
    /// Maximum entries fetched per query and rank lookup.
    pub candidate_cap: u32,
    /// Timeout applied to each store call.
    pub store_timeout: Duration,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            store_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for LeaderboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            candidate_cap: config.candidate_cap,
            store_timeout: config.store_timeout,
        }
    }
}

/// Leaderboard operations over an injected store.
#[derive(Clone)]
pub struct LeaderboardService {
    writer: SyncWriter,
    engine: QueryEngine,
    ranks: RankResolver,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn DocumentStore>, settings: LeaderboardSettings) -> Self {
        let store: Arc<dyn DocumentStore> =
            Arc::new(TimeoutStore::new(store, settings.store_timeout));
        let engine = QueryEngine::new(store.clone(), settings.candidate_cap);

        Self {
            writer: SyncWriter::new(store),
            ranks: RankResolver::new(engine.clone()),
            engine,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// Top `limit` entries for the current period of `timeframe`.
    pub async fn fetch_leaderboard(
        &self,
        metric: Metric,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.fetch_leaderboard_at(metric, timeframe, limit, Utc::now())
            .await
    }

    /// Top `limit` entries for the period containing `now`.
    pub async fn fetch_leaderboard_at(
        &self,
        metric: Metric,
        timeframe: Timeframe,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let period = period_identifier(now, timeframe);
        self.fetch_leaderboard_for_period(metric, timeframe, &period, limit)
            .await
    }

    /// Top `limit` entries for an explicit period identifier.
    ///
    /// The identifier must be well-formed for `timeframe`. Limits above the
    /// candidate cap are clamped to it.
    pub async fn fetch_leaderboard_for_period(
        &self,
        metric: Metric,
        timeframe: Timeframe,
        period: &str,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        if limit == 0 {
            return Err(ValidationError::InvalidLimit(limit).into());
        }
        validate_period(timeframe, period)?;
        let limit = limit.min(self.engine.candidate_cap());

        let list = self.engine.top(metric, timeframe, period, limit).await?;

        if !list.rejected.is_empty() {
            tracing::warn!(
                %timeframe,
                period,
                rejected = list.rejected.len(),
                first = %list.rejected[0],
                "Skipped malformed leaderboard documents"
            );
        }
        tracing::debug!(
            %metric,
            %timeframe,
            period,
            returned = list.entries.len(),
            "Leaderboard fetched"
        );

        Ok(list.entries)
    }

    /// The user's rank in the current period, or `None` when not ranked.
    ///
    /// At most `candidate_cap` documents are fetched, so a user outside
    /// them is reported as not ranked.
    pub async fn get_user_rank(
        &self,
        user_id: &str,
        metric: Metric,
        timeframe: Timeframe,
    ) -> Result<Option<RankResult>, StoreError> {
        self.get_user_rank_at(user_id, metric, timeframe, Utc::now())
            .await
    }

    /// Rank in the period containing `now`.
    pub async fn get_user_rank_at(
        &self,
        user_id: &str,
        metric: Metric,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Option<RankResult>, StoreError> {
        let period = period_identifier(now, timeframe);
        let result = self.ranks.rank(user_id, metric, timeframe, &period).await?;

        tracing::debug!(user_id, %metric, %timeframe, period, ?result, "Rank resolved");
        Ok(result)
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Persist one snapshot of the user's metrics for a period.
    ///
    /// Only the totals are taken from `metrics`; the average pace is always
    /// derived from them. `period` must be well-formed for `timeframe`.
    pub async fn sync_stats(
        &self,
        profile: &UserProfile,
        timeframe: Timeframe,
        period: &str,
        metrics: StatsMetrics,
    ) -> Result<(), LeaderboardError> {
        validate_period(timeframe, period)?;
        let metrics = StatsMetrics::from_totals(
            metrics.total_steps,
            metrics.total_workouts,
            metrics.total_duration_secs,
        );

        let entry = LeaderboardEntry {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
            timeframe,
            period: period.to_string(),
            metrics,
            last_updated: None,
        };

        self.writer.sync(&entry).await?;
        tracing::debug!(user_id = %entry.user_id, %timeframe, period, "Stats synced");
        Ok(())
    }

    /// Re-sync the periods affected by one workout change.
    ///
    /// `workouts` is the user's full set after the change. `previous` is the
    /// workout before the change (absent on create) and `current` after it
    /// (absent on delete). Both versions' periods are recomputed, so moving
    /// a workout to another date also fixes its old periods.
    ///
    /// Returns the number of snapshots written.
    pub async fn record_workout_change(
        &self,
        profile: &UserProfile,
        workouts: &[WorkoutRecord],
        previous: Option<&WorkoutRecord>,
        current: Option<&WorkoutRecord>,
    ) -> Result<usize, StoreError> {
        let keys = aggregator::affected_keys(previous, current);
        let entries = aggregator::aggregate(profile, workouts, &keys);

        self.writer.sync_all(&entries).await?;
        tracing::info!(
            user_id = %profile.user_id,
            periods = entries.len(),
            "Leaderboard entries recomputed"
        );
        Ok(entries.len())
    }

    /// Re-sync every period the user has workouts in.
    pub async fn rebuild_user(
        &self,
        profile: &UserProfile,
        workouts: &[WorkoutRecord],
    ) -> Result<usize, StoreError> {
        let entries = aggregator::aggregate_all(profile, workouts);

        self.writer.sync_all(&entries).await?;
        tracing::info!(
            user_id = %profile.user_id,
            periods = entries.len(),
            workouts = workouts.len(),
            "Leaderboard entries rebuilt"
        );
        Ok(entries.len())
    }
}
