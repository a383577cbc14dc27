// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for tests and local runs.
//!
//! Behaves like the hosted backend as far as the wearable service can tell:
//! sessions map access tokens to identities, rows get sequential IDs, and
//! every request yields to the scheduler once before it completes so
//! concurrent callers interleave the way remote requests do.
//!
//! Failures can be injected per operation class.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::{lookup_then_write, Database, WearableStore};
use crate::error::StoreError;
use crate::models::{
    DeviceConnection, DeviceFilter, DevicePatch, Identity, MetricsQuery, MetricsSnapshot,
    NewDeviceConnection, NewMetricsSnapshot, Session,
};

#[derive(Default)]
struct Tables {
    metrics: Vec<MetricsSnapshot>,
    devices: Vec<DeviceConnection>,
}

#[derive(Default)]
struct Inner {
    /// Access token -> identity
    sessions: DashMap<String, Identity>,
    tables: Mutex<Tables>,
    next_id: AtomicI64,
    fail_auth: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_metric_inserts: AtomicBool,
    fail_device_updates: AtomicBool,
    /// Use the trait's lookup-then-write upsert instead of the atomic one.
    legacy_upsert: AtomicBool,
}

/// In-memory database handle. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an access token for `identity` and return its session.
    pub fn sign_in(&self, token: &str, identity: Identity) -> Session {
        self.inner.sessions.insert(token.to_string(), identity);
        Session::bearer(token)
    }

    /// Make identity lookups fail.
    pub fn fail_auth(&self, fail: bool) {
        self.inner.fail_auth.store(fail, Ordering::SeqCst);
    }

    /// Make every select fail.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every insert/update fail.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make metrics inserts fail while other writes succeed.
    pub fn fail_metric_inserts(&self, fail: bool) {
        self.inner.fail_metric_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make device updates fail while other writes succeed.
    pub fn fail_device_updates(&self, fail: bool) {
        self.inner.fail_device_updates.store(fail, Ordering::SeqCst);
    }

    /// Switch device upserts to the non-atomic lookup-then-write sequence.
    pub fn use_legacy_upsert(&self, legacy: bool) {
        self.inner.legacy_upsert.store(legacy, Ordering::SeqCst);
    }

    /// Snapshot of every device row, for assertions.
    pub fn all_devices(&self) -> Vec<DeviceConnection> {
        self.inner.tables().devices.clone()
    }

    /// Snapshot of every metrics row, for assertions.
    pub fn all_metrics(&self) -> Vec<MetricsSnapshot> {
        self.inner.tables().metrics.clone()
    }
}

impl Inner {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave the rows half-written,
        // so a poisoned lock is still usable.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check(&self, flag: &AtomicBool, what: &'static str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Injected(what));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.check(&self.fail_reads, "read")
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check(&self.fail_writes, "write")
    }

    fn check_metric_insert(&self) -> Result<(), StoreError> {
        self.check_write()?;
        self.check(&self.fail_metric_inserts, "metric insert")
    }

    fn check_device_update(&self) -> Result<(), StoreError> {
        self.check_write()?;
        self.check(&self.fail_device_updates, "device update")
    }
}

impl Database for MemoryDb {
    fn store(&self, session: &Session) -> Arc<dyn WearableStore> {
        Arc::new(MemoryStore {
            inner: self.inner.clone(),
            access_token: session.access_token().map(str::to_string),
        })
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

/// [`MemoryDb`] bound to one session.
pub struct MemoryStore {
    inner: Arc<Inner>,
    access_token: Option<String>,
}

/// Complete a request: the work is already done, the caller observes it
/// one scheduler turn later.
async fn respond<T>(result: Result<T, StoreError>) -> Result<T, StoreError> {
    tokio::task::yield_now().await;
    result
}

#[async_trait]
impl WearableStore for MemoryStore {
    async fn get_identity(&self) -> Result<Option<Identity>, StoreError> {
        let result = self.inner.check(&self.inner.fail_auth, "auth").map(|()| {
            self.access_token
                .as_ref()
                .and_then(|token| self.inner.sessions.get(token).map(|entry| entry.value().clone()))
        });
        respond(result).await
    }

    async fn insert_metric(
        &self,
        metric: &NewMetricsSnapshot,
    ) -> Result<MetricsSnapshot, StoreError> {
        let result = self.inner.check_metric_insert().map(|()| {
            let row = metric.clone().into_snapshot(self.inner.next_id());
            self.inner.tables().metrics.push(row.clone());
            row
        });
        respond(result).await
    }

    async fn query_metrics(
        &self,
        user_id: &str,
        query: MetricsQuery,
    ) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let result = self.inner.check_read().map(|()| {
            let mut rows: Vec<MetricsSnapshot> = self
                .inner
                .tables()
                .metrics
                .iter()
                .filter(|row| row.user_id.as_deref() == Some(user_id))
                .cloned()
                .collect();
            // Newest first; later inserts win timestamp ties.
            rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }
            rows
        });
        respond(result).await
    }

    async fn query_devices(
        &self,
        filter: &DeviceFilter,
    ) -> Result<Vec<DeviceConnection>, StoreError> {
        let result = self.inner.check_read().map(|()| {
            self.inner
                .tables()
                .devices
                .iter()
                .filter(|row| filter.matches(row))
                .cloned()
                .collect()
        });
        respond(result).await
    }

    async fn insert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError> {
        let result = self.inner.check_write().map(|()| {
            let row = new_device_row(device, self.inner.next_id());
            self.inner.tables().devices.push(row.clone());
            row
        });
        respond(result).await
    }

    async fn update_device(
        &self,
        filter: &DeviceFilter,
        patch: &DevicePatch,
    ) -> Result<Vec<DeviceConnection>, StoreError> {
        let result = self.inner.check_device_update().map(|()| {
            let mut tables = self.inner.tables();
            let updated: Vec<DeviceConnection> = tables
                .devices
                .iter_mut()
                .filter(|row| filter.matches(row))
                .map(|row| {
                    patch.apply(row);
                    row.clone()
                })
                .collect();
            updated
        });
        respond(result).await
    }

    async fn upsert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError> {
        if self.inner.legacy_upsert.load(Ordering::SeqCst) {
            return lookup_then_write(self, device).await;
        }

        let result = self.inner.check_write().map(|()| {
            let mut tables = self.inner.tables();
            let lookup =
                DeviceFilter::for_user(device.user_id.clone()).provider(device.provider.clone());

            if let Some(row) = tables.devices.iter_mut().find(|row| lookup.matches(row)) {
                row.status = device.status;
                row.last_synced = Some(device.last_synced);
                return row.clone();
            }

            let row = new_device_row(device, self.inner.next_id());
            tables.devices.push(row.clone());
            row
        });
        respond(result).await
    }
}

fn new_device_row(device: &NewDeviceConnection, id: i64) -> DeviceConnection {
    DeviceConnection {
        id: Some(id),
        user_id: Some(device.user_id.clone()),
        provider: device.provider.clone(),
        status: device.status,
        last_synced: Some(device.last_synced),
    }
}
