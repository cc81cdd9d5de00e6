//! Endpoint configuration for the service adapters.

use crate::error::{AdapterError, Result};
use crate::ServiceFamily;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for one service family.
///
/// An endpoint with an API key is treated as live; without one the family
/// runs against its mock adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// API key for the vendor. Empty strings count as absent.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the vendor API, e.g. "https://api.vendor.example/v1".
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EndpointConfig {
    /// Create a live endpoint configuration.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Some(base_url.into()),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Read `<PREFIX>_API_KEY`, `<PREFIX>_BASE_URL` and `<PREFIX>_TIMEOUT_SECS`.
    pub fn from_env(prefix: &str) -> Self {
        let var = |suffix: &str| {
            std::env::var(format!("{}_{}", prefix, suffix))
                .ok()
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            api_key: var("API_KEY"),
            base_url: var("BASE_URL"),
            timeout_secs: var("TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout_secs),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Whether live credentials are present.
    pub fn is_live(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL, required once the endpoint is live.
    pub fn require_base_url(&self, family: ServiceFamily) -> Result<&str> {
        self.base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                AdapterError::Config(format!(
                    "{} adapter has an API key but no base_url",
                    family
                ))
            })
    }
}

/// Endpoint settings for every service family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptersConfig {
    #[serde(default)]
    pub formation: EndpointConfig,
    #[serde(default)]
    pub legal: EndpointConfig,
    #[serde(default)]
    pub video: EndpointConfig,
    #[serde(default)]
    pub translation: EndpointConfig,
}

impl AdaptersConfig {
    /// Load every family from `FORMATION_*`, `LEGAL_*`, `VIDEO_*` and
    /// `TRANSLATION_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            formation: EndpointConfig::from_env("FORMATION"),
            legal: EndpointConfig::from_env("LEGAL"),
            video: EndpointConfig::from_env("VIDEO"),
            translation: EndpointConfig::from_env("TRANSLATION"),
        }
    }

    /// Endpoint for one family
    pub fn endpoint(&self, family: ServiceFamily) -> &EndpointConfig {
        match family {
            ServiceFamily::Formation => &self.formation,
            ServiceFamily::Legal => &self.legal,
            ServiceFamily::Video => &self.video,
            ServiceFamily::Translation => &self.translation,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
