// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod device;
pub mod identity;
pub mod metrics;
pub mod provider;

pub use device::{DeviceConnection, DeviceFilter, DevicePatch, DeviceStatus, NewDeviceConnection};
pub use identity::{Identity, Session};
pub use metrics::{MetricsQuery, MetricsSnapshot, NewMetricsSnapshot};
pub use provider::Provider;
