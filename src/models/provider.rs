// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wearable provider tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a provider tag accepted from callers.
pub const MAX_PROVIDER_LEN: usize = 32;

/// The device ecosystem a connection or metrics row belongs to.
///
/// Stored and serialized as its lowercase tag (`apple`, `samsung`,
/// `googlefit`). Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Apple,
    Samsung,
    GoogleFit,
    Other(String),
}

impl Provider {
    /// Providers offered by the dashboard, in display order.
    pub const KNOWN: [Provider; 3] = [Provider::Apple, Provider::Samsung, Provider::GoogleFit];

    /// Parse a caller-supplied tag, rejecting anything that is not
    /// 1..=32 characters of `[a-z0-9_-]`.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_PROVIDER_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
        valid.then(|| Self::from(raw.to_string()))
    }

    /// Wire/storage tag.
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Apple => "apple",
            Provider::Samsung => "samsung",
            Provider::GoogleFit => "googlefit",
            Provider::Other(tag) => tag,
        }
    }

    /// Human-readable name shown on device cards.
    pub fn display_name(&self) -> &str {
        match self {
            Provider::Apple => "Apple Health",
            Provider::Samsung => "Samsung Health",
            Provider::GoogleFit => "Google Fit",
            Provider::Other(tag) => tag,
        }
    }
}

impl From<String> for Provider {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "apple" => Provider::Apple,
            "samsung" => Provider::Samsung,
            "googlefit" => Provider::GoogleFit,
            _ => Provider::Other(tag),
        }
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
