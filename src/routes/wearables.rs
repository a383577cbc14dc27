// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearable metrics and device routes.
//!
//! Anonymous callers get demo data. Store failures are logged and surface
//! as empty results (reads) or `status: "failed"` (writes), never as HTTP
//! errors.

use crate::error::{AppError, Result};
use crate::models::{DeviceConnection, MetricsSnapshot, Provider, Session};
use crate::services::{
    AnalyticsReport, ConnectOutcome, ProviderStatus, SyncOutcome, WearableService,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wearables/metrics/latest", get(get_latest_metrics))
        .route("/api/wearables/metrics/history", get(get_metrics_history))
        .route("/api/wearables/analytics", get(get_analytics))
        .route("/api/wearables/devices", get(get_devices))
        .route("/api/wearables/providers", get(get_providers))
        .route(
            "/api/wearables/devices/{provider}/connect",
            post(connect_provider),
        )
        .route("/api/wearables/devices/{provider}/sync", post(sync_provider))
}

fn service(state: &AppState, session: &Session) -> WearableService {
    WearableService::new(state.db.store(session))
}

fn parse_provider(raw: &str) -> Result<Provider> {
    Provider::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid provider '{}': expected 1-32 characters of a-z, 0-9, '_' or '-'",
            raw
        ))
    })
}

// ─── Metrics ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LatestMetricsResponse {
    pub metrics: Option<MetricsSnapshot>,
}

async fn get_latest_metrics(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<LatestMetricsResponse> {
    let metrics = service(&state, &session).latest_snapshot().await;
    Json(LatestMetricsResponse { metrics })
}

#[derive(Serialize)]
pub struct MetricsHistoryResponse {
    pub metrics: Vec<MetricsSnapshot>,
}

async fn get_metrics_history(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<MetricsHistoryResponse> {
    let metrics = service(&state, &session).history().await;
    Json(MetricsHistoryResponse { metrics })
}

async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<AnalyticsReport> {
    Json(service(&state, &session).analytics().await)
}

// ─── Devices ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceConnection>,
}

async fn get_devices(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<DevicesResponse> {
    let devices = service(&state, &session).list_devices().await;
    Json(DevicesResponse { devices })
}

#[derive(Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderStatus>,
}

async fn get_providers(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Json<ProvidersResponse> {
    let providers = service(&state, &session).providers().await;
    Json(ProvidersResponse { providers })
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// "connected" or "failed"
    pub status: String,
    /// True when nothing was stored because the caller is anonymous
    pub demo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceConnection>,
}

async fn connect_provider(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(provider): Path<String>,
) -> Result<Json<ConnectResponse>> {
    let provider = parse_provider(&provider)?;

    let response = match service(&state, &session).connect(&provider).await {
        Some(ConnectOutcome::Demo) => ConnectResponse {
            status: "connected".to_string(),
            demo: true,
            device: None,
        },
        Some(ConnectOutcome::Connected(device)) => ConnectResponse {
            status: "connected".to_string(),
            demo: false,
            device: Some(device),
        },
        None => ConnectResponse {
            status: "failed".to_string(),
            demo: false,
            device: None,
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// "synced" or "failed"
    pub status: String,
    pub demo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

async fn sync_provider(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(provider): Path<String>,
) -> Result<Json<SyncResponse>> {
    let provider = parse_provider(&provider)?;

    let response = match service(&state, &session).simulate_sync(&provider).await {
        Some(SyncOutcome::Demo) => SyncResponse {
            status: "synced".to_string(),
            demo: true,
            metrics: None,
        },
        Some(SyncOutcome::Recorded { metrics, .. }) => SyncResponse {
            status: "synced".to_string(),
            demo: false,
            metrics: Some(metrics),
        },
        None => SyncResponse {
            status: "failed".to_string(),
            demo: false,
            metrics: None,
        },
    };

    Ok(Json(response))
}
