// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;
use tower::ServiceExt;
use wearables_api::config::Config;
use wearables_api::db::MemoryDb;
use wearables_api::models::Identity;
use wearables_api::routes::create_router;
use wearables_api::AppState;

/// Access token registered for [`TEST_USER`] by [`create_test_app`].
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-access-token";
#[allow(dead_code)]
pub const TEST_USER: &str = "0b7e6c52-5a1d-4c7e-9d57-3a2f1e0c9b11";

/// Create a test app backed by an in-memory store with one signed-in user.
/// Returns the router, the shared state and the store handle.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryDb) {
    let db = MemoryDb::new();
    db.sign_in(TEST_TOKEN, Identity::new(TEST_USER));

    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: Arc::new(db.clone()),
    });

    (create_router(state.clone()), state, db)
}

/// Send a request, optionally with a bearer token.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, method: &str, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
