//! Service adapters for the onboarding hub.
//!
//! Every integrated service family (business-formation filing, legal services,
//! video processing, translation/interpreter scheduling) is reached through the
//! same narrow contract, [`ServiceAdapter::invoke`]: an action name plus a JSON
//! parameter object in, a JSON result out. The hub never depends on anything
//! else an adapter does.
//!
//! Two implementations exist for every family:
//!
//! - [`HttpServiceAdapter`] - calls the live vendor API over HTTPS
//! - [`MockAdapter`] - synthesizes deterministic stand-in results
//!
//! Which one a family gets is decided once, when the process composes its
//! [`AdapterSet`] from configuration: a family with an API key is live, a
//! family without one is mocked.
//!
//! # Example
//!
//! ```rust,ignore
//! use adapters::{AdapterSet, AdaptersConfig, ServiceFamily};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let set = AdapterSet::from_config(&AdaptersConfig::from_env())?;
//!     let formation = set.get(ServiceFamily::Formation).expect("configured");
//!
//!     let result = formation
//!         .invoke("check_name_availability", &json!({ "business_name": "Acme LLC" }))
//!         .await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod live;
pub mod mock;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use config::{AdaptersConfig, EndpointConfig};
pub use error::{AdapterError, Result};
pub use live::HttpServiceAdapter;
pub use mock::MockAdapter;
pub use registry::AdapterSet;

/// The external service families the hub integrates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFamily {
    /// Business-formation filing (entity registration, EIN, state tax)
    Formation,
    /// Legal services (consultations, document preparation)
    Legal,
    /// Video hosting and processing
    Video,
    /// Translation and interpreter scheduling
    Translation,
}

impl ServiceFamily {
    /// All families, in a stable order.
    pub const ALL: [ServiceFamily; 4] = [
        ServiceFamily::Formation,
        ServiceFamily::Legal,
        ServiceFamily::Video,
        ServiceFamily::Translation,
    ];

    /// Lowercase identifier used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFamily::Formation => "formation",
            ServiceFamily::Legal => "legal",
            ServiceFamily::Video => "video",
            ServiceFamily::Translation => "translation",
        }
    }
}

impl fmt::Display for ServiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceFamily {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "formation" => Ok(ServiceFamily::Formation),
            "legal" => Ok(ServiceFamily::Legal),
            "video" => Ok(ServiceFamily::Video),
            "translation" => Ok(ServiceFamily::Translation),
            other => Err(AdapterError::Config(format!("Unknown service family: {}", other))),
        }
    }
}

/// Uniform request/response contract for one external service family.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    /// The family this adapter serves
    fn family(&self) -> ServiceFamily;

    /// Perform `action` with the given JSON parameters.
    async fn invoke(&self, action: &str, parameters: &Value) -> Result<Value>;
}
