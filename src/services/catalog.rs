// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Provider cards for the devices screen.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{DeviceConnection, Provider};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub name: String,
    pub connected: bool,
    pub last_synced: Option<DateTime<Utc>>,
}

/// One entry per known provider, in display order, with the caller's
/// connection state. Rows for other providers are ignored.
pub fn provider_statuses(devices: &[DeviceConnection]) -> Vec<ProviderStatus> {
    Provider::KNOWN
        .into_iter()
        .map(|provider| {
            let row = devices.iter().find(|d| d.provider == provider);
            ProviderStatus {
                name: provider.display_name().to_string(),
                connected: row.is_some_and(DeviceConnection::is_connected),
                last_synced: row.and_then(|d| d.last_synced),
                provider,
            }
        })
        .collect()
}
