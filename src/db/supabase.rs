// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client wrapper with typed operations.
//!
//! Talks to two Supabase services over HTTPS:
//! - GoTrue (`/auth/v1/user`) to resolve the caller's identity
//! - PostgREST (`/rest/v1/{table}`) for the metrics and devices tables

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{tables, Database, WearableStore};
use crate::error::StoreError;
use crate::models::{
    DeviceConnection, DeviceFilter, DevicePatch, Identity, MetricsQuery, MetricsSnapshot,
    NewDeviceConnection, NewMetricsSnapshot, Session,
};

/// Audience Supabase puts in access tokens of signed-in users.
const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Shared connection details for one Supabase project.
struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    jwt_secret: Option<Vec<u8>>,
}

/// Supabase database handle.
///
/// Cheap to clone; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct SupabaseDb {
    client: Option<Arc<SupabaseClient>>,
}

impl SupabaseDb {
    /// Create a client for the configured project.
    ///
    /// Placeholder credentials produce an offline handle: every request
    /// fails with [`StoreError::NotConfigured`] and callers fall back to
    /// demo data.
    pub fn new(config: &Config) -> Self {
        if config.is_placeholder() {
            tracing::warn!("Supabase credentials not configured, serving demo data only");
            return Self::new_mock();
        }

        tracing::info!(
            url = %config.supabase_url,
            local_jwt = config.supabase_jwt_secret.is_some(),
            "Supabase client configured"
        );

        Self {
            client: Some(Arc::new(SupabaseClient {
                http: reqwest::Client::new(),
                base_url: config.supabase_url.clone(),
                anon_key: config.supabase_anon_key.clone(),
                jwt_secret: config.supabase_jwt_secret.clone(),
            })),
        }
    }

    /// Create an offline client (no backend).
    pub fn new_mock() -> Self {
        Self { client: None }
    }
}

impl Database for SupabaseDb {
    fn store(&self, session: &Session) -> Arc<dyn WearableStore> {
        Arc::new(SupabaseStore {
            client: self.client.clone(),
            access_token: session.access_token().map(str::to_string),
        })
    }

    fn kind(&self) -> &'static str {
        if self.client.is_some() {
            "supabase"
        } else {
            "offline"
        }
    }
}

/// [`SupabaseDb`] bound to one caller's access token.
///
/// Row-level security in the project decides what the token may see; the
/// filters sent here only narrow the result further.
pub struct SupabaseStore {
    client: Option<Arc<SupabaseClient>>,
    access_token: Option<String>,
}

/// User object returned by `GET /auth/v1/user`.
#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

/// Claims we read from a Supabase access token.
#[derive(Deserialize)]
struct AccessClaims {
    sub: String,
    email: Option<String>,
}

impl SupabaseStore {
    /// Helper to get the client or return an error if offline.
    fn client(&self) -> Result<&SupabaseClient, StoreError> {
        self.client.as_deref().ok_or(StoreError::NotConfigured)
    }

    /// Build a request carrying the project key and the caller's token.
    ///
    /// Anonymous sessions authenticate with the anon key itself.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let client = self.client()?;
        let bearer = self.access_token.as_deref().unwrap_or(client.anon_key.as_str());

        Ok(client
            .http
            .request(method, format!("{}{}", client.base_url, path))
            .header("apikey", &client.anon_key)
            .bearer_auth(bearer))
    }

    fn table(&self, method: Method, table: &str) -> Result<RequestBuilder, StoreError> {
        self.request(method, &format!("/rest/v1/{}", table))
    }

    /// Send a PostgREST request and parse the returned row array.
    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = request.send().await?;
        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("JSON parse error: {}", e)))
    }

    /// Like [`Self::rows`] for writes that must echo exactly one row.
    async fn single_row<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("write returned no rows".to_string()))
    }

    fn verify_locally(&self, secret: &[u8], token: &str) -> Result<Identity, StoreError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        Ok(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// PostgREST filter parameters for a device selector.
fn device_filter_params(filter: &DeviceFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![("user_id", format!("eq.{}", filter.user_id))];
    if let Some(provider) = &filter.provider {
        params.push(("provider", format!("eq.{}", provider)));
    }
    if let Some(id) = filter.id {
        params.push(("id", format!("eq.{}", id)));
    }
    params
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(StoreError::Auth(format!("HTTP {}: {}", status, body)));
    }

    Err(StoreError::Http {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl WearableStore for SupabaseStore {
    async fn get_identity(&self) -> Result<Option<Identity>, StoreError> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };

        let client = self.client()?;
        if let Some(secret) = client.jwt_secret.as_deref() {
            return self.verify_locally(secret, token).map(Some);
        }

        let response = self.request(Method::GET, "/auth/v1/user")?.send().await?;
        let user: AuthUser = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("auth user: {}", e)))?;

        Ok(Some(Identity {
            user_id: user.id,
            email: user.email,
        }))
    }

    async fn insert_metric(
        &self,
        metric: &NewMetricsSnapshot,
    ) -> Result<MetricsSnapshot, StoreError> {
        let request = self
            .table(Method::POST, tables::METRICS)?
            .header("Prefer", "return=representation")
            .json(metric);
        self.single_row(request).await
    }

    async fn query_metrics(
        &self,
        user_id: &str,
        query: MetricsQuery,
    ) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "timestamp.desc".to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let request = self.table(Method::GET, tables::METRICS)?.query(&params);
        self.rows(request).await
    }

    /// Rows in creation order so repeated listings compare equal.
    async fn query_devices(
        &self,
        filter: &DeviceFilter,
    ) -> Result<Vec<DeviceConnection>, StoreError> {
        let request = self
            .table(Method::GET, tables::DEVICES)?
            .query(&[("select", "*"), ("order", "id.asc")])
            .query(&device_filter_params(filter));
        self.rows(request).await
    }

    async fn insert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError> {
        let request = self
            .table(Method::POST, tables::DEVICES)?
            .header("Prefer", "return=representation")
            .json(device);
        self.single_row(request).await
    }

    async fn update_device(
        &self,
        filter: &DeviceFilter,
        patch: &DevicePatch,
    ) -> Result<Vec<DeviceConnection>, StoreError> {
        let request = self
            .table(Method::PATCH, tables::DEVICES)?
            .query(&device_filter_params(filter))
            .header("Prefer", "return=representation")
            .json(patch);
        self.rows(request).await
    }

    /// Single-request upsert keyed on the `(user_id, provider)` unique index.
    async fn upsert_device(
        &self,
        device: &NewDeviceConnection,
    ) -> Result<DeviceConnection, StoreError> {
        let request = self
            .table(Method::POST, tables::DEVICES)?
            .query(&[("on_conflict", "user_id,provider")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(device);
        self.single_row(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    #[test]
    fn test_device_filter_params() {
        let filter = DeviceFilter::for_user("u-1").provider(Provider::GoogleFit).id(3);
        assert_eq!(
            device_filter_params(&filter),
            vec![
                ("user_id", "eq.u-1".to_string()),
                ("provider", "eq.googlefit".to_string()),
                ("id", "eq.3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_offline_store_is_not_configured() {
        let db = SupabaseDb::new_mock();
        assert_eq!(db.kind(), "offline");

        let store = db.store(&Session::bearer("token"));
        assert!(matches!(
            store.get_identity().await,
            Err(StoreError::NotConfigured)
        ));
        assert!(matches!(
            store.query_devices(&DeviceFilter::for_user("u")).await,
            Err(StoreError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_anonymous_session_has_no_identity_even_offline() {
        let store = SupabaseDb::new_mock().store(&Session::anonymous());
        assert_eq!(store.get_identity().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_placeholder_config_yields_offline_handle() {
        let db = SupabaseDb::new(&Config::test_default());
        assert_eq!(db.kind(), "offline");
    }
}
