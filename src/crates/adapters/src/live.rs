//! Live HTTP adapter.
//!
//! Every vendor exposes its operations as JSON-over-HTTPS endpoints, one per
//! action. The live adapter posts the step parameters to
//! `{base_url}/{action}` with a bearer token and returns the decoded JSON body.
//!
//! ```rust,ignore
//! use adapters::{EndpointConfig, HttpServiceAdapter, ServiceAdapter, ServiceFamily};
//!
//! let config = EndpointConfig::new(api_key, "https://filings.example/v1");
//! let adapter = HttpServiceAdapter::new(ServiceFamily::Formation, config)?;
//! let filing = adapter.invoke("submit_formation", &params).await?;
//! ```

use crate::config::EndpointConfig;
use crate::error::{AdapterError, Result};
use crate::{ServiceAdapter, ServiceFamily};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Adapter that calls a vendor API over HTTP.
#[derive(Clone)]
pub struct HttpServiceAdapter {
    family: ServiceFamily,
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for HttpServiceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServiceAdapter")
            .field("family", &self.family)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpServiceAdapter {
    /// Create a live adapter from an endpoint configuration.
    pub fn new(family: ServiceFamily, config: EndpointConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AdapterError::Config(format!("{} adapter requires an API key", family)))?;
        let base_url = config
            .require_base_url(family)?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdapterError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            family,
            base_url,
            api_key,
            client,
        })
    }

    /// URL an action is posted to
    pub fn action_url(&self, action: &str) -> String {
        format!("{}/{}", self.base_url, action)
    }
}

#[async_trait]
impl ServiceAdapter for HttpServiceAdapter {
    fn family(&self) -> ServiceFamily {
        self.family
    }

    async fn invoke(&self, action: &str, parameters: &Value) -> Result<Value> {
        let url = self.action_url(action);
        tracing::debug!(family = %self.family, action, "Calling live service");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(parameters)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AdapterError::Authentication(error_text)
                }
                StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited(error_text),
                StatusCode::NOT_FOUND => AdapterError::unsupported(self.family.as_str(), action),
                _ => AdapterError::Provider(format!(
                    "{} API error {}: {}",
                    self.family, status, error_text
                )),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

        if !body.is_object() {
            return Err(AdapterError::InvalidResponse(format!(
                "{} returned a non-object result for {}",
                self.family, action
            )));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = EndpointConfig {
            api_key: None,
            base_url: Some("https://video.example".to_string()),
            timeout_secs: 5,
        };
        assert!(HttpServiceAdapter::new(ServiceFamily::Video, config).is_err());
    }

    #[test]
    fn test_action_url_trims_trailing_slash() {
        let config = EndpointConfig::new("key", "https://filings.example/v1/");
        let adapter = HttpServiceAdapter::new(ServiceFamily::Formation, config).unwrap();

        assert_eq!(adapter.family(), ServiceFamily::Formation);
        assert_eq!(
            adapter.action_url("submit_formation"),
            "https://filings.example/v1/submit_formation"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = EndpointConfig::new("secret-key", "https://legal.example");
        let adapter = HttpServiceAdapter::new(ServiceFamily::Legal, config).unwrap();

        assert!(!format!("{:?}", adapter).contains("secret-key"));
    }
}
