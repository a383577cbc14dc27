// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data served to anonymous callers.
//!
//! Keeps every screen populated when nobody is signed in or the backend is
//! not configured. Nothing here touches storage.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::StoreError;
use crate::models::{DeviceConnection, DeviceStatus, MetricsSnapshot, Provider};
use crate::services::wearables::{ConnectOutcome, SyncOutcome, WearableSource};

pub const DEMO_STEPS: u32 = 8432;
pub const DEMO_HEART_RATE_AVG: f64 = 72.0;
pub const DEMO_SLEEP_HOURS: f64 = 7.5;
pub const DEMO_CALORIES: f64 = 450.0;
pub const DEMO_SPO2: f64 = 98.0;

/// Days of synthesized history, one row per day.
pub const DEMO_HISTORY_DAYS: usize = 7;

/// Fixed snapshot for the dashboard cards.
pub fn latest_snapshot(now: DateTime<Utc>) -> MetricsSnapshot {
    MetricsSnapshot {
        id: None,
        user_id: None,
        source: Provider::Apple,
        steps: DEMO_STEPS,
        heart_rate_avg: DEMO_HEART_RATE_AVG,
        heart_rate_max: None,
        heart_rate_min: None,
        sleep_duration: DEMO_SLEEP_HOURS,
        calories: DEMO_CALORIES,
        spo2: DEMO_SPO2,
        timestamp: now,
    }
}

/// A week of randomized readings, most recent first, exactly one day apart.
pub fn history(now: DateTime<Utc>) -> Vec<MetricsSnapshot> {
    history_with(&mut rand::rng(), now)
}

pub fn history_with<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<MetricsSnapshot> {
    (0..DEMO_HISTORY_DAYS)
        .map(|day| MetricsSnapshot {
            id: Some(day as i64),
            user_id: None,
            source: if day % 2 == 0 {
                Provider::Apple
            } else {
                Provider::Samsung
            },
            steps: rng.random_range(5000..10000),
            heart_rate_avg: rng.random_range(65.0..75.0),
            heart_rate_max: None,
            heart_rate_min: None,
            sleep_duration: rng.random_range(6.0..9.0),
            calories: rng.random_range(300.0..500.0),
            spo2: rng.random_range(95.0..99.0),
            timestamp: now - Duration::days(day as i64),
        })
        .collect()
}

/// Apple Health shown as connected and freshly synced.
pub fn devices(now: DateTime<Utc>) -> Vec<DeviceConnection> {
    vec![DeviceConnection {
        id: None,
        user_id: None,
        provider: Provider::Apple,
        status: DeviceStatus::Connected,
        last_synced: Some(now),
    }]
}

/// Source used when no identity could be resolved. Never fails and never
/// persists anything.
pub struct DemoSource;

#[async_trait]
impl WearableSource for DemoSource {
    async fn latest_snapshot(&self) -> Result<Option<MetricsSnapshot>, StoreError> {
        Ok(Some(latest_snapshot(Utc::now())))
    }

    async fn history(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        Ok(history(Utc::now()))
    }

    async fn list_devices(&self) -> Result<Vec<DeviceConnection>, StoreError> {
        Ok(devices(Utc::now()))
    }

    async fn connect(&self, provider: &Provider) -> Result<ConnectOutcome, StoreError> {
        tracing::debug!(%provider, "Demo connect, nothing persisted");
        Ok(ConnectOutcome::Demo)
    }

    async fn simulate_sync(&self, provider: &Provider) -> Result<SyncOutcome, StoreError> {
        tracing::debug!(%provider, "Demo sync, nothing persisted");
        Ok(SyncOutcome::Demo)
    }
}
