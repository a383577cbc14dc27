// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearables API: wearable metrics and device connections for the
//! health-records dashboard.
//!
//! This crate fronts a Supabase project (auth + two tables) and falls back
//! to demo data whenever the caller cannot be identified.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
}
