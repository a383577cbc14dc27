// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Missing backend credentials fall back to inert placeholders so the API
//! can start in demo mode without a Supabase project.

use std::env;

/// Backend URL used when `SUPABASE_URL` is not set.
pub const PLACEHOLDER_SUPABASE_URL: &str = "https://placeholder-project.supabase.co";
/// Anon key used when `SUPABASE_ANON_KEY` is not set.
pub const PLACEHOLDER_ANON_KEY: &str = "placeholder-key";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (no trailing slash)
    pub supabase_url: String,
    /// Supabase anon (public) API key
    pub supabase_anon_key: String,
    /// JWT secret for verifying access tokens locally.
    /// When unset, tokens are checked against the auth endpoint.
    pub supabase_jwt_secret: Option<Vec<u8>>,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let supabase_url = env::var("SUPABASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SUPABASE_URL.to_string());

        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "SUPABASE_URL",
                reason: format!("expected an http(s) URL, got '{}'", supabase_url),
            });
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a valid port", raw),
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_ANON_KEY.to_string()),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(String::into_bytes),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: PLACEHOLDER_SUPABASE_URL.to_string(),
            supabase_anon_key: PLACEHOLDER_ANON_KEY.to_string(),
            supabase_jwt_secret: Some(b"test_jwt_secret_32_bytes_minimum".to_vec()),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }

    /// True when either backend credential is still a placeholder.
    /// No request can succeed against such a backend.
    pub fn is_placeholder(&self) -> bool {
        self.supabase_url == PLACEHOLDER_SUPABASE_URL
            || self.supabase_anon_key == PLACEHOLDER_ANON_KEY
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
