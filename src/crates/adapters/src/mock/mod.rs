//! Deterministic mock adapters.
//!
//! Used whenever a family has no live credentials configured. Results are a
//! pure function of `(family, action, parameters)`: identifiers are derived
//! from a SHA-256 digest of the request, so the same request always yields the
//! same response and tests can assert on exact values.

mod formation;
mod legal;
mod translation;
mod video;

use crate::error::{AdapterError, Result};
use crate::{ServiceAdapter, ServiceFamily};
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Stand-in adapter for one service family.
#[derive(Debug, Clone, Copy)]
pub struct MockAdapter {
    family: ServiceFamily,
}

impl MockAdapter {
    /// Create a mock adapter for a family
    pub fn new(family: ServiceFamily) -> Self {
        Self { family }
    }
}

#[async_trait]
impl ServiceAdapter for MockAdapter {
    fn family(&self) -> ServiceFamily {
        self.family
    }

    async fn invoke(&self, action: &str, parameters: &Value) -> Result<Value> {
        tracing::debug!(family = %self.family, action, "Synthesizing mock result");

        match self.family {
            ServiceFamily::Formation => formation::invoke(action, parameters),
            ServiceFamily::Legal => legal::invoke(action, parameters),
            ServiceFamily::Video => video::invoke(action, parameters),
            ServiceFamily::Translation => translation::invoke(action, parameters),
        }
    }
}

/// Stable identifier: `<prefix>_<first 12 hex chars of sha256(action + params)>`.
pub(crate) fn stable_id(prefix: &str, action: &str, parameters: &Value) -> String {
    let digest = Sha256::new()
        .chain_update(action.as_bytes())
        .chain_update(parameters.to_string().as_bytes())
        .finalize();
    let hex = format!("{:x}", digest);
    format!("{}_{}", prefix, &hex[..12])
}

/// Required string parameter.
pub(crate) fn required_str<'a>(parameters: &'a Value, name: &str) -> Result<&'a str> {
    parameters
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AdapterError::InvalidParameters(format!("missing '{}'", name)))
}

pub(crate) fn optional_str<'a>(parameters: &'a Value, name: &str) -> Option<&'a str> {
    parameters.get(name).and_then(Value::as_str)
}
