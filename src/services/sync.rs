// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Simulated provider sync.
//!
//! There is no real device integration: a "sync" manufactures one plausible
//! set of readings for the provider.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::ops::Range;

use crate::models::{NewMetricsSnapshot, Provider};

pub const STEPS_RANGE: Range<u32> = 3000..10000;
pub const HEART_RATE_AVG_RANGE: Range<f64> = 70.0..85.0;
pub const HEART_RATE_MAX: f64 = 120.0;
pub const HEART_RATE_MIN: f64 = 55.0;
/// Whole hours.
pub const SLEEP_HOURS_RANGE: Range<u32> = 4..8;
/// Calories are drawn in tenths of a kcal so the value keeps one decimal.
pub const CALORIE_TENTHS_RANGE: Range<u32> = 0..4000;
pub const SPO2_RANGE: Range<f64> = 94.0..99.0;

/// Readings for one simulated sync, drawn from the thread-local RNG.
pub fn simulated_reading(user_id: &str, provider: &Provider, now: DateTime<Utc>) -> NewMetricsSnapshot {
    simulated_reading_with(&mut rand::rng(), user_id, provider, now)
}

/// Readings for one simulated sync, drawn from `rng`.
pub fn simulated_reading_with<R: Rng>(
    rng: &mut R,
    user_id: &str,
    provider: &Provider,
    now: DateTime<Utc>,
) -> NewMetricsSnapshot {
    NewMetricsSnapshot {
        user_id: user_id.to_string(),
        source: provider.clone(),
        steps: rng.random_range(STEPS_RANGE),
        heart_rate_avg: rng.random_range(HEART_RATE_AVG_RANGE),
        heart_rate_max: HEART_RATE_MAX,
        heart_rate_min: HEART_RATE_MIN,
        sleep_duration: f64::from(rng.random_range(SLEEP_HOURS_RANGE)),
        calories: f64::from(rng.random_range(CALORIE_TENTHS_RANGE)) / 10.0,
        spo2: rng.random_range(SPO2_RANGE),
        timestamp: now,
    }
}
