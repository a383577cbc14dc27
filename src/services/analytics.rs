// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chart and summary shaping for the analytics screen.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{MetricsSnapshot, Provider};

/// Rows shown in the "recent sync history" list.
pub const RECENT_SYNC_LIMIT: usize = 5;

/// One point on the metrics charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub source: Provider,
    pub steps: u32,
    pub heart_rate_avg: u32,
    pub sleep_duration: u32,
    pub calories: f64,
    pub spo2: f64,
}

/// One entry of the recent sync list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSync {
    pub source: Provider,
    pub timestamp: DateTime<Utc>,
    pub steps: u32,
    pub calories: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// Oldest first, for left-to-right charts.
    pub points: Vec<ChartPoint>,
    /// Most recent row, if any.
    pub latest: Option<MetricsSnapshot>,
    /// Newest first, at most [`RECENT_SYNC_LIMIT`].
    pub recent_syncs: Vec<RecentSync>,
}

fn round(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Build the report from a newest-first history.
pub fn build_report(history: Vec<MetricsSnapshot>) -> AnalyticsReport {
    let points = history
        .iter()
        .rev()
        .map(|m| ChartPoint {
            timestamp: m.timestamp,
            source: m.source.clone(),
            steps: m.steps,
            heart_rate_avg: round(m.heart_rate_avg),
            sleep_duration: round(m.sleep_duration),
            calories: m.calories,
            spo2: m.spo2,
        })
        .collect();

    let recent_syncs = history
        .iter()
        .take(RECENT_SYNC_LIMIT)
        .map(|m| RecentSync {
            source: m.source.clone(),
            timestamp: m.timestamp,
            steps: m.steps,
            calories: round(m.calories),
        })
        .collect();

    AnalyticsReport {
        points,
        latest: history.into_iter().next(),
        recent_syncs,
    }
}
