// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use fitness_leaderboard::config::Config;
use fitness_leaderboard::db::{FirestoreDb, MemoryStore};
use fitness_leaderboard::error::StoreError;
use fitness_leaderboard::models::{UserProfile, WorkoutRecord};
use fitness_leaderboard::routes::create_router;
use fitness_leaderboard::services::{
    LeaderboardService, LeaderboardSettings, ProfileSource, WorkoutSource,
};
use fitness_leaderboard::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Parse an RFC3339 timestamp.
#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Profiles and workouts held in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct TestSources {
    profiles: DashMap<String, UserProfile>,
    workouts: DashMap<String, Vec<WorkoutRecord>>,
}

#[allow(dead_code)]
impl TestSources {
    pub fn add_profile(&self, user_id: &str, display_name: &str) -> UserProfile {
        let profile = UserProfile {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            photo_url: None,
        };
        self.profiles.insert(user_id.to_string(), profile.clone());
        profile
    }

    /// Replace the user's workout set.
    pub fn set_workouts(&self, user_id: &str, workouts: Vec<WorkoutRecord>) {
        self.workouts.insert(user_id.to_string(), workouts);
    }
}

#[async_trait]
impl WorkoutSource for TestSources {
    async fn workouts_for_user(&self, user_id: &str) -> Result<Vec<WorkoutRecord>, StoreError> {
        Ok(self
            .workouts
            .get(user_id)
            .map(|w| w.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProfileSource for TestSources {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }
}

/// Build a workout at an RFC3339 time.
#[allow(dead_code)]
pub fn workout(id: &str, user_id: &str, at: &str, steps: u64, duration_secs: u64) -> WorkoutRecord {
    WorkoutRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        timestamp: parse_time(at),
        steps,
        floors: 0,
        duration_secs,
        pace: None,
    }
}

/// A fixed instant inside week 2025-W40, month 2025-10 and year 2025.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
}

/// Test harness backed by an in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub sources: Arc<TestSources>,
}

/// Create a test app over an in-memory store and in-memory sources.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let sources = Arc::new(TestSources::default());

    let leaderboard = LeaderboardService::new(store.clone(), LeaderboardSettings::from(&config));

    let state = Arc::new(AppState {
        config,
        leaderboard,
        workouts: sources.clone(),
        profiles: sources.clone(),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        sources,
    }
}
