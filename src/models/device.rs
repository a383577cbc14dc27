// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device connection records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Provider;

/// Connection state of a provider for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Connected,
    Disconnected,
    #[serde(other)]
    Unknown,
}

/// Whether and when a provider was last synced (`wearable_devices` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConnection {
    /// Row ID assigned by the store (absent on demo rows)
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub provider: Provider,
    pub status: DeviceStatus,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

impl DeviceConnection {
    pub fn is_connected(&self) -> bool {
        self.status == DeviceStatus::Connected
    }
}

/// Insert/upsert payload for a device row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDeviceConnection {
    pub user_id: String,
    pub provider: Provider,
    pub status: DeviceStatus,
    pub last_synced: DateTime<Utc>,
}

/// Row selector for device reads and updates. Always scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    pub user_id: String,
    pub provider: Option<Provider>,
    pub id: Option<i64>,
}

impl DeviceFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            provider: None,
            id: None,
        }
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn matches(&self, device: &DeviceConnection) -> bool {
        device.user_id.as_deref() == Some(self.user_id.as_str())
            && self.provider.as_ref().map_or(true, |p| *p == device.provider)
            && self.id.map_or(true, |id| device.id == Some(id))
    }
}

/// Partial update for device rows. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DevicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl DevicePatch {
    pub fn apply(&self, device: &mut DeviceConnection) {
        if let Some(status) = self.status {
            device.status = status;
        }
        if let Some(last_synced) = self.last_synced {
            device.last_synced = Some(last_synced);
        }
    }
}
