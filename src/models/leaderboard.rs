// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard entry model and its stored document schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::db::{Document, Fields};
use crate::error::ValidationError;
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};

/// Stored field names (camelCase, shared with the mobile client).
pub mod fields {
    pub const USER_ID: &str = "userId";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const PHOTO_URL: &str = "photoUrl";
    pub const TIMEFRAME: &str = "timeframe";
    pub const PERIOD: &str = "period";
    pub const TOTAL_STEPS: &str = "totalSteps";
    pub const TOTAL_WORKOUTS: &str = "totalWorkouts";
    pub const TOTAL_DURATION: &str = "totalDuration";
    pub const AVERAGE_STEPS_PER_MINUTE: &str = "averageStepsPerMinute";
    pub const LAST_UPDATED: &str = "lastUpdated";
}

/// Leaderboard window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Weekly,
    Monthly,
    Yearly,
    AllTime,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Weekly,
        Timeframe::Monthly,
        Timeframe::Yearly,
        Timeframe::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::Yearly => "yearly",
            Timeframe::AllTime => "all_time",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            "yearly" => Ok(Timeframe::Yearly),
            "all_time" => Ok(Timeframe::AllTime),
            other => Err(ValidationError::UnknownTimeframe(other.to_string())),
        }
    }
}

/// Ranking metric. Each variant maps to exactly one entry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Steps,
    Workouts,
    Duration,
    Pace,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Steps => "steps",
            Metric::Workouts => "workouts",
            Metric::Duration => "duration",
            Metric::Pace => "pace",
        }
    }

    /// The value this metric ranks by. `None` only for a pace that is
    /// undefined (zero total duration).
    pub fn value(&self, metrics: &StatsMetrics) -> Option<f64> {
        match self {
            Metric::Steps => Some(metrics.total_steps as f64),
            Metric::Workouts => Some(f64::from(metrics.total_workouts)),
            Metric::Duration => Some(metrics.total_duration_secs as f64),
            Metric::Pace => metrics.average_steps_per_minute,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps" => Ok(Metric::Steps),
            "workouts" => Ok(Metric::Workouts),
            "duration" => Ok(Metric::Duration),
            "pace" => Ok(Metric::Pace),
            other => Err(ValidationError::UnknownMetric(other.to_string())),
        }
    }
}

/// A (timeframe, period identifier) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub timeframe: Timeframe,
    pub period: String,
}

/// Rolled-up metric totals for one user in one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsMetrics {
    pub total_steps: u64,
    pub total_workouts: u32,
    pub total_duration_secs: u64,
    /// Undefined when total duration is zero.
    pub average_steps_per_minute: Option<f64>,
}

impl StatsMetrics {
    /// Build totals, deriving the average pace from steps and duration.
    pub fn from_totals(total_steps: u64, total_workouts: u32, total_duration_secs: u64) -> Self {
        let average_steps_per_minute = if total_duration_secs == 0 {
            None
        } else {
            Some(total_steps as f64 / (total_duration_secs as f64 / 60.0))
        };

        Self {
            total_steps,
            total_workouts,
            total_duration_secs,
            average_steps_per_minute,
        }
    }
}

/// One user's aggregated snapshot for one (timeframe, period).
///
/// Stored at: `leaderboard_entries/{user_id}_{timeframe}_{period}`
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub timeframe: Timeframe,
    pub period: String,
    pub metrics: StatsMetrics,
    /// Assigned by the store on write; `None` on snapshots not yet written.
    pub last_updated: Option<DateTime<Utc>>,
}

impl LeaderboardEntry {
    /// Composite document key. The user id is URL-encoded so it cannot
    /// collide with the separator or contain a path segment.
    pub fn document_key(&self) -> String {
        entry_key(&self.user_id, self.timeframe, &self.period)
    }

    /// Full field set written on sync. `lastUpdated` is left to the store.
    ///
    /// An undefined pace is written as an explicit null so a merge clears
    /// any previously stored value.
    pub fn to_fields(&self) -> Fields {
        let mut map = Fields::new();
        map.insert(fields::USER_ID.to_string(), json!(self.user_id));
        map.insert(fields::DISPLAY_NAME.to_string(), json!(self.display_name));
        map.insert(fields::PHOTO_URL.to_string(), json!(self.photo_url));
        map.insert(fields::TIMEFRAME.to_string(), json!(self.timeframe.as_str()));
        map.insert(fields::PERIOD.to_string(), json!(self.period));
        map.insert(
            fields::TOTAL_STEPS.to_string(),
            json!(self.metrics.total_steps),
        );
        map.insert(
            fields::TOTAL_WORKOUTS.to_string(),
            json!(self.metrics.total_workouts),
        );
        map.insert(
            fields::TOTAL_DURATION.to_string(),
            json!(self.metrics.total_duration_secs),
        );
        map.insert(
            fields::AVERAGE_STEPS_PER_MINUTE.to_string(),
            json!(self.metrics.average_steps_per_minute),
        );
        map
    }

    /// Validate a stored document against the entry schema.
    pub fn from_document(doc: &Document) -> Result<Self, ValidationError> {
        let key = doc.key.as_str();
        let f = &doc.fields;

        let timeframe = required_str(key, f, fields::TIMEFRAME)?
            .parse::<Timeframe>()
            .map_err(|e| ValidationError::malformed(key, e.to_string()))?;

        let total_workouts = u32::try_from(required_u64(key, f, fields::TOTAL_WORKOUTS)?)
            .map_err(|_| ValidationError::malformed(key, "totalWorkouts out of range"))?;

        let last_updated = match f.get(fields::LAST_UPDATED) {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(
                parse_utc_rfc3339(raw)
                    .ok_or_else(|| ValidationError::malformed(key, "lastUpdated is not RFC3339"))?,
            ),
            Some(_) => {
                return Err(ValidationError::malformed(key, "lastUpdated has wrong type"));
            }
        };

        Ok(Self {
            user_id: required_str(key, f, fields::USER_ID)?.to_string(),
            display_name: required_str(key, f, fields::DISPLAY_NAME)?.to_string(),
            photo_url: optional_str(key, f, fields::PHOTO_URL)?,
            timeframe,
            period: required_str(key, f, fields::PERIOD)?.to_string(),
            metrics: StatsMetrics {
                total_steps: required_u64(key, f, fields::TOTAL_STEPS)?,
                total_workouts,
                total_duration_secs: required_u64(key, f, fields::TOTAL_DURATION)?,
                average_steps_per_minute: optional_f64(key, f, fields::AVERAGE_STEPS_PER_MINUTE)?,
            },
            last_updated,
        })
    }

    /// `lastUpdated` formatted for API responses.
    pub fn last_updated_rfc3339(&self) -> Option<String> {
        self.last_updated.map(format_utc_rfc3339)
    }
}

/// Composite key for a (user, timeframe, period) entry.
pub fn entry_key(user_id: &str, timeframe: Timeframe, period: &str) -> String {
    format!("{}_{}_{}", urlencoding::encode(user_id), timeframe, period)
}

/// A user's position on a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankResult {
    /// 1-indexed position.
    pub rank: u32,
    /// Number of ranked candidates considered.
    pub total: u32,
}

fn required_str<'a>(key: &str, f: &'a Fields, name: &str) -> Result<&'a str, ValidationError> {
    match f.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::malformed(key, format!("{name} is not a string"))),
        None => Err(ValidationError::malformed(key, format!("missing {name}"))),
    }
}

fn optional_str(key: &str, f: &Fields, name: &str) -> Result<Option<String>, ValidationError> {
    match f.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::malformed(key, format!("{name} is not a string"))),
    }
}

fn required_u64(key: &str, f: &Fields, name: &str) -> Result<u64, ValidationError> {
    match f.get(name) {
        Some(v) => v.as_u64().ok_or_else(|| {
            ValidationError::malformed(key, format!("{name} is not a non-negative integer"))
        }),
        None => Err(ValidationError::malformed(key, format!("missing {name}"))),
    }
}

fn optional_f64(key: &str, f: &Fields, name: &str) -> Result<Option<f64>, ValidationError> {
    match f.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(ValidationError::malformed(key, format!("{name} is not a number"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: "alice".to_string(),
            display_name: "Alice".to_string(),
            photo_url: Some("https://example.com/a.jpg".to_string()),
            timeframe: Timeframe::Weekly,
            period: "2025-W40".to_string(),
            metrics: StatsMetrics::from_totals(6000, 2, 3600),
            last_updated: None,
        }
    }

    #[test]
    fn test_from_totals_derives_pace() {
        let metrics = StatsMetrics::from_totals(6000, 2, 3600);
        assert_eq!(metrics.average_steps_per_minute, Some(100.0));
    }

    #[test]
    fn test_from_totals_zero_duration_has_no_pace() {
        let metrics = StatsMetrics::from_totals(500, 1, 0);
        assert_eq!(metrics.average_steps_per_minute, None);
        assert_eq!(Metric::Pace.value(&metrics), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("all_time".parse::<Timeframe>().unwrap(), Timeframe::AllTime);
        assert_eq!("pace".parse::<Metric>().unwrap(), Metric::Pace);
        assert!(matches!(
            "daily".parse::<Timeframe>(),
            Err(ValidationError::UnknownTimeframe(_))
        ));
        assert!(matches!(
            "calories".parse::<Metric>(),
            Err(ValidationError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_document_key_encodes_user_id() {
        let mut entry = sample_entry();
        entry.user_id = "a/b c".to_string();
        assert_eq!(entry.document_key(), "a%2Fb%20c_weekly_2025-W40");
    }

    #[test]
    fn test_fields_write_null_pace() {
        let mut entry = sample_entry();
        entry.metrics = StatsMetrics::from_totals(10, 1, 0);
        let map = entry.to_fields();
        assert_eq!(map.get(fields::AVERAGE_STEPS_PER_MINUTE), Some(&Value::Null));
        assert!(map.get(fields::LAST_UPDATED).is_none());
    }

    #[test]
    fn test_document_schema_accepts_written_fields() {
        let entry = sample_entry();
        let mut map = entry.to_fields();
        map.insert(
            fields::LAST_UPDATED.to_string(),
            Value::String("2025-10-01T12:00:00Z".to_string()),
        );
        let doc = Document {
            key: entry.document_key(),
            fields: map,
        };

        let parsed = LeaderboardEntry::from_document(&doc).unwrap();
        assert_eq!(parsed.user_id, "alice");
        assert_eq!(parsed.metrics, entry.metrics);
        assert_eq!(
            parsed.last_updated_rfc3339().as_deref(),
            Some("2025-10-01T12:00:00Z")
        );
    }

    #[test]
    fn test_document_schema_rejects_wrong_types() {
        let mut map = sample_entry().to_fields();
        map.insert(fields::TOTAL_STEPS.to_string(), json!("lots"));
        let doc = Document {
            key: "bad".to_string(),
            fields: map,
        };

        let err = LeaderboardEntry::from_document(&doc).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedDocument { ref key, .. } if key == "bad"));
    }

    #[test]
    fn test_document_schema_rejects_missing_fields() {
        let mut map = sample_entry().to_fields();
        map.remove(fields::USER_ID);
        let doc = Document {
            key: "missing".to_string(),
            fields: map,
        };

        assert!(LeaderboardEntry::from_document(&doc).is_err());
    }
}
