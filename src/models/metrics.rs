// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearable metrics rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Provider;

/// One recorded set of biometric readings (`wearable_metrics` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Row ID assigned by the store
    #[serde(default)]
    pub id: Option<i64>,
    /// Owner (absent on demo rows)
    #[serde(default)]
    pub user_id: Option<String>,
    /// Provider the readings were pulled from
    pub source: Provider,
    pub steps: u32,
    pub heart_rate_avg: f64,
    #[serde(default)]
    pub heart_rate_max: Option<f64>,
    #[serde(default)]
    pub heart_rate_min: Option<f64>,
    /// Sleep duration in hours
    pub sleep_duration: f64,
    /// Energy estimate in kcal
    pub calories: f64,
    /// Blood oxygen saturation in percent
    pub spo2: f64,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

/// Insert payload for a metrics row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMetricsSnapshot {
    pub user_id: String,
    pub source: Provider,
    pub steps: u32,
    pub heart_rate_avg: f64,
    pub heart_rate_max: f64,
    pub heart_rate_min: f64,
    pub sleep_duration: f64,
    pub calories: f64,
    pub spo2: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewMetricsSnapshot {
    /// The row as the store would return it once assigned an ID.
    pub fn into_snapshot(self, id: i64) -> MetricsSnapshot {
        MetricsSnapshot {
            id: Some(id),
            user_id: Some(self.user_id),
            source: self.source,
            steps: self.steps,
            heart_rate_avg: self.heart_rate_avg,
            heart_rate_max: Some(self.heart_rate_max),
            heart_rate_min: Some(self.heart_rate_min),
            sleep_duration: self.sleep_duration,
            calories: self.calories,
            spo2: self.spo2,
            timestamp: self.timestamp,
        }
    }
}

/// Read options for metrics queries. Rows always come back newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsQuery {
    pub limit: Option<usize>,
}

impl MetricsQuery {
    pub fn latest() -> Self {
        Self { limit: Some(1) }
    }

    pub fn all() -> Self {
        Self { limit: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_postgrest_row() {
        // numeric columns come back as JSON numbers; min/max may be null
        let json = r#"{
            "id": 42,
            "user_id": "3f1c",
            "source": "samsung",
            "steps": 5120,
            "heart_rate_avg": 77.3,
            "heart_rate_max": null,
            "heart_rate_min": 55,
            "sleep_duration": 6,
            "calories": 212.4,
            "spo2": 96.1,
            "timestamp": "2026-02-01T08:30:00+00:00"
        }"#;

        let row: MetricsSnapshot = serde_json::from_str(json).expect("row should parse");
        assert_eq!(row.id, Some(42));
        assert_eq!(row.source, Provider::Samsung);
        assert_eq!(row.heart_rate_max, None);
        assert_eq!(row.heart_rate_min, Some(55.0));
        assert_eq!(row.timestamp.to_rfc3339(), "2026-02-01T08:30:00+00:00");
    }
}
