// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness Leaderboard API Server
//!
//! Rolls workouts up into weekly, monthly, yearly and all-time snapshots
//! and serves ranked leaderboards over them.

use fitness_leaderboard::{
    config::Config,
    db::FirestoreDb,
    services::{LeaderboardService, LeaderboardSettings},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        candidate_cap = config.candidate_cap,
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "Starting Fitness Leaderboard API"
    );

    // Initialize Firestore database
    let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);

    let leaderboard = LeaderboardService::new(db.clone(), LeaderboardSettings::from(&config));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        leaderboard,
        workouts: db.clone(),
        profiles: db,
    });

    // Build router
    let app = fitness_leaderboard::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitness_leaderboard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
