// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stats aggregation: workouts to per-period leaderboard snapshots.
//!
//! Totals are always recomputed from the user's full workout set for each
//! affected period, never adjusted by deltas, so edits and deletes cannot
//! double-count.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{LeaderboardEntry, PeriodKey, StatsMetrics, UserProfile, WorkoutRecord};
use crate::services::period::period_keys;

/// Running totals for one period.
#[derive(Debug, Default, Clone, Copy)]
struct PeriodTotals {
    steps: u64,
    workouts: u32,
    duration_secs: u64,
}

impl PeriodTotals {
    fn add(&mut self, workout: &WorkoutRecord) {
        self.steps = self.steps.saturating_add(workout.steps);
        self.workouts = self.workouts.saturating_add(1);
        self.duration_secs = self.duration_secs.saturating_add(workout.duration_secs);
    }

    fn into_metrics(self) -> StatsMetrics {
        StatsMetrics::from_totals(self.steps, self.workouts, self.duration_secs)
    }
}

/// Periods touched by a change from `previous` to `current`.
///
/// Both versions count: a workout moved to another date leaves its old
/// periods with stale totals unless they are recomputed too. `None` on
/// either side covers creation and deletion.
pub fn affected_keys(
    previous: Option<&WorkoutRecord>,
    current: Option<&WorkoutRecord>,
) -> BTreeSet<PeriodKey> {
    previous
        .into_iter()
        .chain(current)
        .flat_map(|w| period_keys(w.timestamp))
        .collect()
}

/// Every period any of the user's workouts falls into.
fn all_keys(user_id: &str, workouts: &[WorkoutRecord]) -> BTreeSet<PeriodKey> {
    workouts
        .iter()
        .filter(|w| w.user_id == user_id)
        .flat_map(|w| period_keys(w.timestamp))
        .collect()
}

/// Recompute one snapshot per key in `keys` from the user's full workout set.
///
/// A key with no remaining workouts yields a zeroed snapshot so the stale
/// stored totals get overwritten. Workouts owned by other users are ignored.
pub fn aggregate(
    profile: &UserProfile,
    workouts: &[WorkoutRecord],
    keys: &BTreeSet<PeriodKey>,
) -> Vec<LeaderboardEntry> {
    let mut totals: BTreeMap<&PeriodKey, PeriodTotals> =
        keys.iter().map(|key| (key, PeriodTotals::default())).collect();

    for workout in workouts.iter().filter(|w| w.user_id == profile.user_id) {
        for key in period_keys(workout.timestamp) {
            if let Some(bucket) = totals.get_mut(&key) {
                bucket.add(workout);
            }
        }
    }

    totals
        .into_iter()
        .map(|(key, bucket)| LeaderboardEntry {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
            timeframe: key.timeframe,
            period: key.period.clone(),
            metrics: bucket.into_metrics(),
            last_updated: None,
        })
        .collect()
}

/// Snapshots for every period the user has any workout in.
pub fn aggregate_all(profile: &UserProfile, workouts: &[WorkoutRecord]) -> Vec<LeaderboardEntry> {
    aggregate(profile, workouts, &all_keys(&profile.user_id, workouts))
}
