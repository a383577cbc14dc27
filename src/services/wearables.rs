// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearable metrics and device access with demo fallback.
//!
//! Every operation resolves the caller's identity first. Signed-in callers
//! are served from storage through [`LiveSource`]; anonymous callers get
//! [`DemoSource`] data. The branch lives only in [`WearableService::source`].
//!
//! Each operation comes in two flavours:
//! - `try_*` returns the store error so callers can tell "failed" from
//!   "empty";
//! - the plain variant logs the error and returns an empty/absent result,
//!   which is what the dashboard consumes.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::db::WearableStore;
use crate::error::StoreError;
use crate::models::{
    DeviceConnection, DeviceFilter, DevicePatch, DeviceStatus, Identity, MetricsQuery,
    MetricsSnapshot, NewDeviceConnection, Provider,
};
use crate::services::analytics::{self, AnalyticsReport};
use crate::services::catalog::{self, ProviderStatus};
use crate::services::demo::DemoSource;
use crate::services::identity::resolve_identity;
use crate::services::sync;

/// Result of connecting a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// Anonymous caller; reported as success, nothing stored.
    Demo,
    /// The stored connection row after the upsert.
    Connected(DeviceConnection),
}

/// Result of a simulated sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Anonymous caller; nothing stored.
    Demo,
    Recorded {
        metrics: MetricsSnapshot,
        /// Connection rows whose last-synced time was refreshed. Zero when
        /// the provider was never connected.
        devices_touched: usize,
    },
}

/// Data operations behind one identity decision.
#[async_trait]
pub trait WearableSource: Send + Sync {
    async fn latest_snapshot(&self) -> Result<Option<MetricsSnapshot>, StoreError>;

    /// Newest first.
    async fn history(&self) -> Result<Vec<MetricsSnapshot>, StoreError>;

    async fn list_devices(&self) -> Result<Vec<DeviceConnection>, StoreError>;

    async fn connect(&self, provider: &Provider) -> Result<ConnectOutcome, StoreError>;

    async fn simulate_sync(&self, provider: &Provider) -> Result<SyncOutcome, StoreError>;
}

/// Storage-backed source for a signed-in user.
pub struct LiveSource {
    store: Arc<dyn WearableStore>,
    identity: Identity,
}

impl LiveSource {
    pub fn new(store: Arc<dyn WearableStore>, identity: Identity) -> Self {
        Self { store, identity }
    }

    fn user_id(&self) -> &str {
        &self.identity.user_id
    }
}

#[async_trait]
impl WearableSource for LiveSource {
    async fn latest_snapshot(&self) -> Result<Option<MetricsSnapshot>, StoreError> {
        let rows = self
            .store
            .query_metrics(self.user_id(), MetricsQuery::latest())
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn history(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        self.store
            .query_metrics(self.user_id(), MetricsQuery::all())
            .await
    }

    async fn list_devices(&self) -> Result<Vec<DeviceConnection>, StoreError> {
        self.store
            .query_devices(&DeviceFilter::for_user(self.user_id()))
            .await
    }

    async fn connect(&self, provider: &Provider) -> Result<ConnectOutcome, StoreError> {
        let device = NewDeviceConnection {
            user_id: self.user_id().to_string(),
            provider: provider.clone(),
            status: DeviceStatus::Connected,
            last_synced: Utc::now(),
        };

        let row = self.store.upsert_device(&device).await?;
        tracing::info!(user_id = self.user_id(), %provider, "Provider connected");
        Ok(ConnectOutcome::Connected(row))
    }

    async fn simulate_sync(&self, provider: &Provider) -> Result<SyncOutcome, StoreError> {
        let now = Utc::now();
        let reading = sync::simulated_reading(self.user_id(), provider, now);

        // Two independent requests: the device update runs even when the
        // insert failed, and neither is rolled back if the other fails.
        let inserted = self.store.insert_metric(&reading).await;
        if let Err(e) = &inserted {
            tracing::warn!(user_id = self.user_id(), %provider, error = %e, "Error inserting metrics");
        }

        let filter = DeviceFilter::for_user(self.user_id()).provider(provider.clone());
        let patch = DevicePatch {
            status: None,
            last_synced: Some(now),
        };
        let touched = self.store.update_device(&filter, &patch).await;
        if let Err(e) = &touched {
            tracing::warn!(user_id = self.user_id(), %provider, error = %e, "Error updating device sync time");
        }

        match (inserted, touched) {
            (Ok(metrics), Ok(devices)) => {
                tracing::info!(
                    user_id = self.user_id(),
                    %provider,
                    devices_touched = devices.len(),
                    "Simulated sync recorded"
                );
                Ok(SyncOutcome::Recorded {
                    metrics,
                    devices_touched: devices.len(),
                })
            }
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => {
                tracing::warn!(
                    user_id = self.user_id(),
                    %provider,
                    "Sync partially applied; metrics and device sync time disagree"
                );
                Err(e)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }
}

/// Wearable operations for one session.
///
/// Holds no state between calls; identity is re-resolved every time.
#[derive(Clone)]
pub struct WearableService {
    store: Arc<dyn WearableStore>,
}

impl WearableService {
    pub fn new(store: Arc<dyn WearableStore>) -> Self {
        Self { store }
    }

    /// Pick the data source for this call: live storage for a resolved
    /// identity, demo data otherwise.
    pub async fn source(&self) -> Box<dyn WearableSource> {
        match resolve_identity(self.store.as_ref()).await {
            Some(identity) => Box::new(LiveSource::new(self.store.clone(), identity)),
            None => Box::new(DemoSource),
        }
    }

    // ─── Fallible operations ─────────────────────────────────────

    pub async fn try_latest_snapshot(&self) -> Result<Option<MetricsSnapshot>, StoreError> {
        self.source().await.latest_snapshot().await
    }

    pub async fn try_history(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        self.source().await.history().await
    }

    pub async fn try_list_devices(&self) -> Result<Vec<DeviceConnection>, StoreError> {
        self.source().await.list_devices().await
    }

    pub async fn try_connect(&self, provider: &Provider) -> Result<ConnectOutcome, StoreError> {
        self.source().await.connect(provider).await
    }

    pub async fn try_simulate_sync(&self, provider: &Provider) -> Result<SyncOutcome, StoreError> {
        self.source().await.simulate_sync(provider).await
    }

    // ─── Dashboard operations (errors logged, never returned) ────

    /// Most recent snapshot; `None` when there is none or the read failed.
    pub async fn latest_snapshot(&self) -> Option<MetricsSnapshot> {
        logged(self.try_latest_snapshot().await, "latest metrics").flatten()
    }

    /// Metrics history, newest first; empty when the read failed.
    pub async fn history(&self) -> Vec<MetricsSnapshot> {
        logged(self.try_history().await, "metrics history").unwrap_or_default()
    }

    /// Connection rows; empty when the read failed.
    pub async fn list_devices(&self) -> Vec<DeviceConnection> {
        logged(self.try_list_devices().await, "device list").unwrap_or_default()
    }

    /// `None` when the write failed.
    pub async fn connect(&self, provider: &Provider) -> Option<ConnectOutcome> {
        logged(self.try_connect(provider).await, "connect")
    }

    /// `None` when either write failed.
    pub async fn simulate_sync(&self, provider: &Provider) -> Option<SyncOutcome> {
        logged(self.try_simulate_sync(provider).await, "sync")
    }

    /// Chart-ready view of [`Self::history`].
    pub async fn analytics(&self) -> AnalyticsReport {
        analytics::build_report(self.history().await)
    }

    /// Known providers merged with the caller's connection rows.
    pub async fn providers(&self) -> Vec<ProviderStatus> {
        catalog::provider_statuses(&self.list_devices().await)
    }
}

fn logged<T>(result: Result<T, StoreError>, operation: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Wearable store request failed");
            None
        }
    }
}
