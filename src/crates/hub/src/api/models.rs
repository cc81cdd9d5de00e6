//! API request and response models
//!
//! The three business-workflow requests and [`TranslationRequest`] are
//! accepted as-is from the library; only workflow creation and event
//! publication need API-specific shapes.
//!
//! [`TranslationRequest`]: crate::model::TranslationRequest

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::error::ApiError;
use crate::model::{OwnerProfile, StepSpec};

/// POST /api/v1/workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<StepSpec>,
    #[serde(default)]
    pub owner: OwnerProfile,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl CreateWorkflowRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Workflow name cannot be empty".to_string(),
            ));
        }
        if self.name.len() > 255 {
            return Err(ApiError::ValidationError(
                "Workflow name cannot exceed 255 characters".to_string(),
            ));
        }
        if self.steps.is_empty() {
            return Err(ApiError::ValidationError(
                "A workflow needs at least one step".to_string(),
            ));
        }
        Ok(())
    }
}

/// POST /api/v1/events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEventRequest {
    pub event_type: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub data: Value,
}

impl PublishEventRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.event_type.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Event type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_source() -> String {
    "api".to_string()
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_workflows: usize,
}

impl HealthResponse {
    pub fn new(status: impl Into<String>, active_workflows: usize) -> Self {
        Self {
            status: status.into(),
            version: crate::version().to_string(),
            active_workflows,
        }
    }
}
