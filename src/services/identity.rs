// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution.

use crate::db::WearableStore;
use crate::models::Identity;

/// Resolve the session owner. Never fails.
///
/// Any error from the auth service (placeholder credentials, network
/// failure, rejected token) is treated exactly like an anonymous session.
pub async fn resolve_identity(store: &dyn WearableStore) -> Option<Identity> {
    match store.get_identity().await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "Identity resolution failed, continuing anonymously");
            None
        }
    }
}
