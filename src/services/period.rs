// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Period key resolution.
//!
//! Every instant is bucketed in UTC, so two devices in different zones
//! always agree on the bucket. Identifiers sort lexicographically in
//! chronological order within a timeframe:
//!
//! | timeframe | identifier  |
//! |-----------|-------------|
//! | weekly    | `2025-W07` (ISO week-year and week) |
//! | monthly   | `2025-02`   |
//! | yearly    | `2025`      |
//! | all-time  | `all-time`  |

use chrono::{DateTime, Datelike, Utc};

use crate::error::ValidationError;
use crate::models::{PeriodKey, Timeframe};

/// Identifier shared by every instant in the all-time timeframe.
pub const ALL_TIME_PERIOD: &str = "all-time";

/// Period identifier for `at` within `timeframe`.
pub fn period_identifier(at: DateTime<Utc>, timeframe: Timeframe) -> String {
    match timeframe {
        Timeframe::Weekly => {
            // ISO week-year, not the calendar year: 2024-12-30 is 2025-W01.
            let week = at.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Timeframe::Monthly => format!("{:04}-{:02}", at.year(), at.month()),
        Timeframe::Yearly => format!("{:04}", at.year()),
        Timeframe::AllTime => ALL_TIME_PERIOD.to_string(),
    }
}

/// Full period key for `at` within `timeframe`.
pub fn period_key(at: DateTime<Utc>, timeframe: Timeframe) -> PeriodKey {
    PeriodKey {
        timeframe,
        period: period_identifier(at, timeframe),
    }
}

/// Check that `period` is a well-formed identifier for `timeframe`.
pub fn validate_period(timeframe: Timeframe, period: &str) -> Result<(), ValidationError> {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let in_range = |s: &str, lo: u32, hi: u32| {
        digits(s) && s.len() == 2 && s.parse::<u32>().is_ok_and(|n| (lo..=hi).contains(&n))
    };

    let valid = match timeframe {
        Timeframe::Weekly => period
            .split_once("-W")
            .is_some_and(|(year, week)| year.len() == 4 && digits(year) && in_range(week, 1, 53)),
        Timeframe::Monthly => period
            .split_once('-')
            .is_some_and(|(year, month)| year.len() == 4 && digits(year) && in_range(month, 1, 12)),
        Timeframe::Yearly => period.len() == 4 && digits(period),
        Timeframe::AllTime => period == ALL_TIME_PERIOD,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidPeriod {
            timeframe: timeframe.to_string(),
            period: period.to_string(),
        })
    }
}

/// The keys of every timeframe that `at` falls into.
pub fn period_keys(at: DateTime<Utc>) -> impl Iterator<Item = PeriodKey> {
    Timeframe::ALL.into_iter().map(move |tf| period_key(at, tf))
}
