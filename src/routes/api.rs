// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard API routes.

use crate::error::{AppError, Result};
use crate::models::{LeaderboardEntry, Metric, StatsMetrics, Timeframe, UserProfile, WorkoutRecord};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Leaderboard API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/leaderboard/rank", get(get_rank))
        .route("/api/stats/sync", post(sync_stats))
        .route("/api/workouts/{user_id}/recompute", post(recompute_workouts))
}

fn parse_metric(raw: &str) -> Result<Metric> {
    Ok(raw.parse::<Metric>()?)
}

fn parse_timeframe(raw: &str) -> Result<Timeframe> {
    Ok(raw.parse::<Timeframe>()?)
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    metric: String,
    timeframe: String,
    /// Defaults to the configured leaderboard size.
    limit: Option<u32>,
    /// Explicit period identifier; the current period when absent.
    period: Option<String>,
}

/// One ranked row.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Value of the requested metric; `null` for an undefined pace.
    pub value: Option<f64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_steps: u64,
    pub total_workouts: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_duration_secs: u64,
    pub average_steps_per_minute: Option<f64>,
    pub last_updated: Option<String>,
}

impl LeaderboardRow {
    fn new(rank: u32, metric: Metric, entry: LeaderboardEntry) -> Self {
        let last_updated = entry.last_updated_rfc3339();
        let value = metric.value(&entry.metrics);
        Self {
            rank,
            user_id: entry.user_id,
            display_name: entry.display_name,
            photo_url: entry.photo_url,
            value,
            total_steps: entry.metrics.total_steps,
            total_workouts: entry.metrics.total_workouts,
            total_duration_secs: entry.metrics.total_duration_secs,
            average_steps_per_minute: entry.metrics.average_steps_per_minute,
            last_updated,
        }
    }
}

/// Leaderboard response.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub metric: String,
    pub timeframe: String,
    /// Period identifier the rows belong to, or `null` for the current period.
    pub period: Option<String>,
    pub entries: Vec<LeaderboardRow>,
}

/// Get the top entries for a metric and timeframe.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let metric = parse_metric(&params.metric)?;
    let timeframe = parse_timeframe(&params.timeframe)?;
    let limit = params.limit.unwrap_or(state.config.default_limit);

    let entries = match params.period.as_deref() {
        Some(period) => {
            state
                .leaderboard
                .fetch_leaderboard_for_period(metric, timeframe, period, limit)
                .await?
        }
        None => {
            state
                .leaderboard
                .fetch_leaderboard(metric, timeframe, limit)
                .await?
        }
    };

    let entries = entries
        .into_iter()
        .zip(1u32..)
        .map(|(entry, rank)| LeaderboardRow::new(rank, metric, entry))
        .collect();

    Ok(Json(LeaderboardResponse {
        metric: metric.to_string(),
        timeframe: timeframe.to_string(),
        period: params.period,
        entries,
    }))
}

// ─── Rank ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RankQuery {
    user_id: String,
    metric: String,
    timeframe: String,
}

/// Rank response. `ranked` is false when the user is not among the
/// candidates; that is not an error.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankResponse {
    pub user_id: String,
    pub ranked: bool,
    pub rank: Option<u32>,
    pub total: Option<u32>,
}

/// Get one user's rank in the current period.
async fn get_rank(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankQuery>,
) -> Result<Json<RankResponse>> {
    let metric = parse_metric(&params.metric)?;
    let timeframe = parse_timeframe(&params.timeframe)?;

    let result = state
        .leaderboard
        .get_user_rank(&params.user_id, metric, timeframe)
        .await?;

    Ok(Json(RankResponse {
        user_id: params.user_id,
        ranked: result.is_some(),
        rank: result.map(|r| r.rank),
        total: result.map(|r| r.total),
    }))
}

// ─── Writes ──────────────────────────────────────────────────

/// Request body for a single snapshot write.
#[derive(Deserialize)]
pub struct SyncStatsRequest {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub timeframe: String,
    pub period: String,
    pub metrics: SyncTotals,
}

/// Raw totals for a sync. The average pace is derived server-side, so a
/// client-supplied pace is ignored.
#[derive(Deserialize)]
pub struct SyncTotals {
    pub total_steps: u64,
    pub total_workouts: u32,
    pub total_duration_secs: u64,
}

impl From<SyncTotals> for StatsMetrics {
    fn from(totals: SyncTotals) -> Self {
        StatsMetrics::from_totals(
            totals.total_steps,
            totals.total_workouts,
            totals.total_duration_secs,
        )
    }
}

/// Response for write endpoints.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncResponse {
    pub success: bool,
    /// Snapshots written.
    pub synced: usize,
}

/// Write one user's snapshot for one period.
async fn sync_stats(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SyncStatsRequest>,
) -> Result<Json<SyncResponse>> {
    if body.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".to_string()));
    }
    let timeframe = parse_timeframe(&body.timeframe)?;

    let profile = UserProfile {
        user_id: body.user_id,
        display_name: body.display_name,
        photo_url: body.photo_url,
    };

    state
        .leaderboard
        .sync_stats(&profile, timeframe, &body.period, body.metrics.into())
        .await?;

    Ok(Json(SyncResponse {
        success: true,
        synced: 1,
    }))
}

/// Request body for recomputing after a workout change.
///
/// Omitting both versions rebuilds every period the user has workouts in.
#[derive(Deserialize, Default)]
pub struct RecomputeRequest {
    /// The workout before the change; absent when it was just created.
    #[serde(default)]
    pub previous: Option<WorkoutRecord>,
    /// The workout after the change; absent when it was deleted.
    #[serde(default)]
    pub current: Option<WorkoutRecord>,
}

fn check_owner(user_id: &str, workout: Option<&WorkoutRecord>) -> Result<()> {
    match workout {
        Some(w) if w.user_id != user_id => Err(AppError::BadRequest(format!(
            "Workout {} does not belong to user {}",
            w.id, user_id
        ))),
        _ => Ok(()),
    }
}

/// Recompute a user's leaderboard entries from their stored workouts.
async fn recompute_workouts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<RecomputeRequest>,
) -> Result<Json<SyncResponse>> {
    check_owner(&user_id, body.previous.as_ref())?;
    check_owner(&user_id, body.current.as_ref())?;

    let profile = state
        .profiles
        .profile(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    let workouts = state.workouts.workouts_for_user(&user_id).await?;

    let synced = if body.previous.is_none() && body.current.is_none() {
        state.leaderboard.rebuild_user(&profile, &workouts).await?
    } else {
        state
            .leaderboard
            .record_workout_change(
                &profile,
                &workouts,
                body.previous.as_ref(),
                body.current.as_ref(),
            )
            .await?
    };

    Ok(Json(SyncResponse {
        success: true,
        synced,
    }))
}
