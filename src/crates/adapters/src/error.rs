//! Error types for service adapters.

use thiserror::Error;

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur when invoking an external service.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The adapter does not implement the requested action.
    #[error("Unsupported action '{action}' for {family} service")]
    UnsupportedAction { family: String, action: String },

    /// Parameters are missing or malformed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The vendor answered with something that is not a usable result.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The vendor reported an error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    /// Create an UnsupportedAction error
    pub fn unsupported(family: impl Into<String>, action: impl Into<String>) -> Self {
        AdapterError::UnsupportedAction {
            family: family.into(),
            action: action.into(),
        }
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AdapterError::Authentication(_))
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_family_and_action() {
        let err = AdapterError::unsupported("video", "transcode");
        assert_eq!(err.to_string(), "Unsupported action 'transcode' for video service");
    }

    #[test]
    fn test_auth_error_detection() {
        assert!(AdapterError::Authentication("bad key".into()).is_auth_error());
        assert!(!AdapterError::Provider("boom".into()).is_auth_error());
    }
}
