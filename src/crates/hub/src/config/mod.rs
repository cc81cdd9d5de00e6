//! Hub configuration
//!
//! Loaded from YAML (with `$include` and `${ENV:default}` support, see
//! [`loader`]) or assembled from environment variables. Every section has
//! defaults, so an empty file is a valid configuration: in-memory storage and
//! mock adapters for every service family.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! database:
//!   url: ${HUB_DATABASE_URL:sqlite:hub.db}
//! engine:
//!   queue_capacity: 64
//! events:
//!   retention: 10000
//! adapters:
//!   formation:
//!     api_key: ${FORMATION_API_KEY:}
//!     base_url: https://filings.example/v1
//! ```

pub mod loader;

pub use loader::{deep_merge, load_layered_yaml_config, load_yaml_config, load_yaml_file};

use crate::engine::EngineConfig;
use crate::events::EventBusConfig;
use crate::Result;
use adapters::AdaptersConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Workflow storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection string. Unset means in-memory storage.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Complete hub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub events: EventBusConfig,
    #[serde(default)]
    pub adapters: AdaptersConfig,
}

impl HubConfig {
    /// Load from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: HubConfig = load_yaml_config(path)?;
        tracing::debug!(?config.server, "Configuration loaded");
        Ok(config)
    }

    /// Load `base` with each overlay merged over it in order, so a local
    /// file only needs the keys it changes.
    pub fn load_layered<P: AsRef<Path>>(base: P, overlays: &[P]) -> Result<Self> {
        let mut paths: Vec<&Path> = vec![base.as_ref()];
        paths.extend(overlays.iter().map(|p| p.as_ref()));

        let config: HubConfig = load_layered_yaml_config(&paths)?;
        tracing::debug!(?config.server, overlays = overlays.len(), "Layered configuration loaded");
        Ok(config)
    }

    /// Defaults, with `HUB_DATABASE_URL` and the adapters' environment
    /// variables applied.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig {
                url: std::env::var("HUB_DATABASE_URL")
                    .ok()
                    .filter(|u| !u.trim().is_empty()),
                ..Default::default()
            },
            adapters: AdaptersConfig::from_env(),
            ..Default::default()
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}
