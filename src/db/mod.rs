// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The backing store is reached through two traits:
//! - [`Database`] is the process-wide handle (HTTP client, credentials);
//! - [`WearableStore`] is a view of it bound to one caller's session.

pub mod memory;
pub mod supabase;

pub use memory::MemoryDb;
pub use supabase::SupabaseDb;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::{
    DeviceConnection, DeviceFilter, DevicePatch, Identity, MetricsQuery, MetricsSnapshot,
    NewDeviceConnection, NewMetricsSnapshot, Session,
};

/// Table names as constants.
pub mod tables {
    pub const METRICS: &str = "wearable_metrics";
    pub const DEVICES: &str = "wearable_devices";
}

/// Hands out session-scoped stores.
pub trait Database: Send + Sync {
    /// Bind the backend to the caller's session.
    fn store(&self, session: &Session) -> Arc<dyn WearableStore>;

    /// Short backend label for health output.
    fn kind(&self) -> &'static str;
}

/// Storage capability used by the wearable service.
#[async_trait]
pub trait WearableStore: Send + Sync {
    /// Identity of the session owner, `None` for anonymous sessions.
    async fn get_identity(&self) -> Result<Option<Identity>, StoreError>;

    /// Append a metrics row and return it as stored.
    async fn insert_metric(&self, metric: &NewMetricsSnapshot)
        -> Result<MetricsSnapshot, StoreError>;

    /// Metrics rows for one user, newest first.
    async fn query_metrics(
        &self,
        user_id: &str,
        query: MetricsQuery,
    ) -> Result<Vec<MetricsSnapshot>, StoreError>;

    /// Device rows matching `filter`, oldest first.
    async fn query_devices(&self, filter: &DeviceFilter)
        -> Result<Vec<DeviceConnection>, StoreError>;

    async fn insert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError>;

    /// Patch every row matching `filter`; returns the updated rows.
    async fn update_device(
        &self,
        filter: &DeviceFilter,
        patch: &DevicePatch,
    ) -> Result<Vec<DeviceConnection>, StoreError>;

    /// Create or refresh the (user, provider) row.
    ///
    /// Defaults to [`lookup_then_write`]. Stores that support it override
    /// this with a single atomic request.
    async fn upsert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError> {
        lookup_then_write(self, device).await
    }
}

/// Upsert as a lookup followed by an update or an insert.
///
/// The requests are independent: two concurrent callers can both miss the
/// lookup and insert duplicate rows for the same (user, provider).
pub async fn lookup_then_write<S: WearableStore + ?Sized>(
    store: &S,
    device: &NewDeviceConnection,
) -> Result<DeviceConnection, StoreError> {
    let lookup = DeviceFilter::for_user(device.user_id.clone()).provider(device.provider.clone());
    let existing = store.query_devices(&lookup).await?;

    match existing.first().and_then(|row| row.id) {
        Some(id) => {
            let patch = DevicePatch {
                status: Some(device.status),
                last_synced: Some(device.last_synced),
            };
            let updated = store
                .update_device(&DeviceFilter::for_user(device.user_id.clone()).id(id), &patch)
                .await?;
            updated
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::Decode(format!("device {} vanished during update", id)))
        }
        None => store.insert_device(device).await,
    }
}
