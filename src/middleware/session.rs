// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session extraction middleware.
//!
//! Unlike a login gate, this never rejects: a request without credentials
//! carries an anonymous [`Session`] and is served demo data downstream.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::Session;

/// Cookie the dashboard stores the Supabase access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Attach the caller's [`Session`] to the request extensions.
pub async fn attach_session(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let session = session_from_parts(&jar, request.headers());
    tracing::debug!(authenticated = session.access_token().is_some(), "Session attached");
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Bearer header first, then cookie. The scheme name is case-insensitive.
fn session_from_parts(jar: &CookieJar, headers: &axum::http::HeaderMap) -> Session {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Session::bearer(token);
    }

    match jar.get(ACCESS_TOKEN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => Session::bearer(cookie.value()),
        _ => Session::anonymous(),
    }
}
