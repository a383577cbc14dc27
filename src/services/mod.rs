// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod catalog;
pub mod demo;
pub mod identity;
pub mod sync;
pub mod wearables;

pub use analytics::AnalyticsReport;
pub use catalog::ProviderStatus;
pub use wearables::{ConnectOutcome, SyncOutcome, WearableService, WearableSource};
