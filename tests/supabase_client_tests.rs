// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client tests against a local fake of the REST and auth APIs.
//!
//! The fake records every request so the tests can check the PostgREST
//! filters, headers and bodies the client sends.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wearables_api::config::Config;
use wearables_api::db::{Database, SupabaseDb, WearableStore};
use wearables_api::error::StoreError;
use wearables_api::models::{
    DeviceFilter, DevicePatch, DeviceStatus, MetricsQuery, NewDeviceConnection, Provider, Session,
};
use wearables_api::services::{ConnectOutcome, WearableService};

const ANON_KEY: &str = "anon-test-key";
const GOOD_TOKEN: &str = "good-token";
const USER_ID: &str = "7d2f3c1e-0000-4000-8000-000000000001";
const JWT_SECRET: &[u8] = b"local_jwt_secret_for_tests_only!";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn fake_backend(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();
    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers: headers.clone(),
        body: body.clone(),
    });

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match (method.as_str(), path.as_str()) {
        ("GET", "/auth/v1/user") => {
            if bearer == format!("Bearer {}", GOOD_TOKEN) {
                Json(json!({ "id": USER_ID, "email": "runner@example.com" })).into_response()
            } else {
                (StatusCode::UNAUTHORIZED, "invalid JWT").into_response()
            }
        }
        ("GET", "/rest/v1/wearable_metrics") => Json(json!([{
            "id": 11,
            "user_id": USER_ID,
            "source": "samsung",
            "steps": 4321,
            "heart_rate_avg": 71.5,
            "heart_rate_max": 120,
            "heart_rate_min": 55,
            "sleep_duration": 6,
            "calories": 250.5,
            "spo2": 97.2,
            "timestamp": "2026-03-01T08:00:00+00:00"
        }]))
        .into_response(),
        // Apple readings fail to insert; everything else is echoed back.
        ("POST", "/rest/v1/wearable_metrics") if body["source"] == "apple" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "insert exploded").into_response()
        }
        ("POST", "/rest/v1/wearable_metrics") | ("POST", "/rest/v1/wearable_devices") => {
            let mut row = body;
            row["id"] = json!(1);
            Json(json!([row])).into_response()
        }
        ("GET", "/rest/v1/wearable_devices") => Json(json!([])).into_response(),
        // Samsung device rows cannot be updated.
        ("PATCH", "/rest/v1/wearable_devices")
            if query.get("provider").map(String::as_str) == Some("eq.samsung") =>
        {
            (StatusCode::INTERNAL_SERVER_ERROR, "update exploded").into_response()
        }
        ("PATCH", "/rest/v1/wearable_devices") => Json(json!([])).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the fake backend and return a config pointing at it.
async fn start_backend(jwt_secret: Option<&[u8]>) -> (Config, Log) {
    let log: Log = Arc::default();
    let app = Router::new().fallback(fake_backend).with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config {
        supabase_url: format!("http://{}", addr),
        supabase_anon_key: ANON_KEY.to_string(),
        supabase_jwt_secret: jwt_secret.map(<[u8]>::to_vec),
        frontend_url: "http://localhost:5173".to_string(),
        port: 0,
    };
    (config, log)
}

fn last_request(log: &Log) -> Recorded {
    log.lock().unwrap().last().cloned().expect("no request recorded")
}

fn signed_token(aud: &str) -> String {
    let claims = json!({
        "sub": USER_ID,
        "email": "runner@example.com",
        "aud": aud,
        "exp": (Utc::now().timestamp() + 3600),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET)).unwrap()
}

#[tokio::test]
async fn test_identity_from_auth_endpoint() {
    let (config, log) = start_backend(None).await;
    let db = SupabaseDb::new(&config);
    assert_eq!(db.kind(), "supabase");

    let identity = db
        .store(&Session::bearer(GOOD_TOKEN))
        .get_identity()
        .await
        .unwrap()
        .expect("identity");
    assert_eq!(identity.user_id, USER_ID);
    assert_eq!(identity.email.as_deref(), Some("runner@example.com"));

    let request = last_request(&log);
    assert_eq!(request.path, "/auth/v1/user");
    assert_eq!(request.headers.get("apikey").unwrap(), ANON_KEY);

    let rejected = db.store(&Session::bearer("stale")).get_identity().await;
    assert!(matches!(rejected, Err(StoreError::Auth(_))));
}

#[tokio::test]
async fn test_identity_verified_locally_with_jwt_secret() {
    let (config, log) = start_backend(Some(JWT_SECRET)).await;
    let db = SupabaseDb::new(&config);

    let identity = db
        .store(&Session::bearer(signed_token("authenticated")))
        .get_identity()
        .await
        .unwrap()
        .expect("identity");
    assert_eq!(identity.user_id, USER_ID);

    let wrong_audience = db
        .store(&Session::bearer(signed_token("anon")))
        .get_identity()
        .await;
    assert!(matches!(wrong_audience, Err(StoreError::Auth(_))));

    assert!(log.lock().unwrap().is_empty(), "no network round-trip expected");
}

#[tokio::test]
async fn test_metrics_query_parameters() {
    let (config, log) = start_backend(None).await;
    let store = SupabaseDb::new(&config).store(&Session::bearer(GOOD_TOKEN));

    let rows = store
        .query_metrics(USER_ID, MetricsQuery::latest())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source, Provider::Samsung);
    assert_eq!(rows[0].steps, 4321);

    let request = last_request(&log);
    assert_eq!(request.query["user_id"], format!("eq.{}", USER_ID));
    assert_eq!(request.query["order"], "timestamp.desc");
    assert_eq!(request.query["limit"], "1");
    assert_eq!(
        request.headers.get("authorization").unwrap(),
        format!("Bearer {}", GOOD_TOKEN).as_str()
    );

    store.query_metrics(USER_ID, MetricsQuery::all()).await.unwrap();
    assert!(!last_request(&log).query.contains_key("limit"));
}

#[tokio::test]
async fn test_upsert_uses_conflict_target() {
    let (config, log) = start_backend(None).await;
    let store = SupabaseDb::new(&config).store(&Session::bearer(GOOD_TOKEN));

    let row = store
        .upsert_device(&NewDeviceConnection {
            user_id: USER_ID.to_string(),
            provider: Provider::GoogleFit,
            status: DeviceStatus::Connected,
            last_synced: Utc::now(),
        })
        .await
        .unwrap();
    assert_eq!(row.id, Some(1));
    assert_eq!(row.provider, Provider::GoogleFit);

    let request = last_request(&log);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.query["on_conflict"], "user_id,provider");
    let prefer = request.headers.get("prefer").unwrap().to_str().unwrap();
    assert!(prefer.contains("resolution=merge-duplicates"));
    assert!(prefer.contains("return=representation"));
    assert_eq!(request.body["provider"], "googlefit");
    assert_eq!(request.body["status"], "connected");
}

#[tokio::test]
async fn test_update_sends_filters_and_sparse_patch() {
    let (config, log) = start_backend(None).await;
    let store = SupabaseDb::new(&config).store(&Session::bearer(GOOD_TOKEN));

    let updated = store
        .update_device(
            &DeviceFilter::for_user(USER_ID).provider(Provider::Apple),
            &DevicePatch {
                status: None,
                last_synced: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert!(updated.is_empty());

    let request = last_request(&log);
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.query["user_id"], format!("eq.{}", USER_ID));
    assert_eq!(request.query["provider"], "eq.apple");
    assert!(request.body.get("status").is_none());
    assert!(request.body.get("last_synced").is_some());
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let (config, log) = start_backend(None).await;
    let db = SupabaseDb::new(&config);
    let service = WearableService::new(db.store(&Session::bearer(GOOD_TOKEN)));

    let result = service.try_simulate_sync(&Provider::Apple).await;
    assert!(matches!(result, Err(StoreError::Http { status: 500, .. })));

    // The device sync time is still written after the failed insert.
    let request = last_request(&log);
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/rest/v1/wearable_devices");
    assert_eq!(request.query["provider"], "eq.apple");

    // The dashboard flavour swallows it.
    assert!(service.simulate_sync(&Provider::Apple).await.is_none());
}

#[tokio::test]
async fn test_failed_device_update_does_not_undo_insert() {
    let (config, log) = start_backend(None).await;
    let db = SupabaseDb::new(&config);
    let service = WearableService::new(db.store(&Session::bearer(GOOD_TOKEN)));

    let result = service.try_simulate_sync(&Provider::Samsung).await;
    assert!(matches!(result, Err(StoreError::Http { status: 500, .. })));

    let calls: Vec<(Method, String)> = log
        .lock()
        .unwrap()
        .iter()
        .map(|r| (r.method.clone(), r.path.clone()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::GET, "/auth/v1/user".to_string()),
            (Method::POST, "/rest/v1/wearable_metrics".to_string()),
            (Method::PATCH, "/rest/v1/wearable_devices".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_device_query_has_stable_order() {
    let (config, log) = start_backend(None).await;
    let store = SupabaseDb::new(&config).store(&Session::bearer(GOOD_TOKEN));

    store
        .query_devices(&DeviceFilter::for_user(USER_ID))
        .await
        .unwrap();

    let request = last_request(&log);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.query["order"], "id.asc");
    assert_eq!(request.query["user_id"], format!("eq.{}", USER_ID));
}

#[tokio::test]
async fn test_connect_end_to_end() {
    let (config, log) = start_backend(None).await;
    let db = SupabaseDb::new(&config);
    let service = WearableService::new(db.store(&Session::bearer(GOOD_TOKEN)));

    let outcome = service.try_connect(&Provider::Samsung).await.unwrap();
    let ConnectOutcome::Connected(device) = outcome else {
        panic!("expected a stored connection, got {:?}", outcome);
    };
    assert_eq!(device.user_id.as_deref(), Some(USER_ID));
    assert_eq!(device.provider, Provider::Samsung);

    let paths: Vec<String> = log.lock().unwrap().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/auth/v1/user", "/rest/v1/wearable_devices"]);
}

#[tokio::test]
async fn test_anonymous_connect_sends_nothing() {
    let (config, log) = start_backend(None).await;
    let service = WearableService::new(SupabaseDb::new(&config).store(&Session::anonymous()));

    assert_eq!(
        service.try_connect(&Provider::Apple).await.unwrap(),
        ConnectOutcome::Demo
    );
    assert!(log.lock().unwrap().is_empty());
}
