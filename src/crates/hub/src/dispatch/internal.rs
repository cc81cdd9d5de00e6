use super::params::{optional_str, require_str};
use super::{DispatchError, StepHandler};
use crate::model::ServiceKind;
use crate::{HubError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

const ENTITY_TYPES: &[&str] = &[
    "llc",
    "corporation",
    "s_corp",
    "nonprofit",
    "partnership",
    "sole_proprietorship",
];

/// Business-logic steps evaluated in-process
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalSteps;

impl InternalSteps {
    fn validate_business_info(action: &str, parameters: &Value) -> Result<Value> {
        let name = require_str(action, parameters, "business_name")?.trim();
        let entity_type = require_str(action, parameters, "entity_type")?.to_ascii_lowercase();
        let state = require_str(action, parameters, "state")?.trim().to_ascii_uppercase();

        if name.len() < 2 {
            return Err(HubError::InvalidInput(format!(
                "Business name '{}' is too short",
                name
            )));
        }
        if !ENTITY_TYPES.contains(&entity_type.as_str()) {
            return Err(HubError::InvalidInput(format!(
                "Unsupported entity type '{}'",
                entity_type
            )));
        }
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(HubError::InvalidInput(format!(
                "State must be a two-letter code, got '{}'",
                state
            )));
        }

        Ok(json!({
            "valid": true,
            "business_name": name,
            "entity_type": entity_type,
            "state": state,
        }))
    }

    fn record_milestone(action: &str, parameters: &Value) -> Result<Value> {
        let milestone = require_str(action, parameters, "milestone")?;
        Ok(json!({
            "milestone": milestone,
            "note": optional_str(parameters, "note"),
            "recorded_at": Utc::now().to_rfc3339(),
        }))
    }
}

#[async_trait]
impl StepHandler for InternalSteps {
    fn service(&self) -> ServiceKind {
        ServiceKind::Internal
    }

    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value> {
        match action {
            "validate_business_info" => Self::validate_business_info(action, parameters),
            "record_milestone" => Self::record_milestone(action, parameters),
            other => Err(DispatchError::unknown_action(self.service(), other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_business_info_normalizes() {
        let result = InternalSteps
            .handle(
                "validate_business_info",
                &json!({ "business_name": " Acme ", "entity_type": "LLC", "state": "de" }),
            )
            .await
            .unwrap();

        assert_eq!(result["valid"], true);
        assert_eq!(result["business_name"], "Acme");
        assert_eq!(result["entity_type"], "llc");
        assert_eq!(result["state"], "DE");
    }

    #[tokio::test]
    async fn test_validate_business_info_rejects_bad_state() {
        let err = InternalSteps
            .handle(
                "validate_business_info",
                &json!({ "business_name": "Acme", "entity_type": "llc", "state": "Delaware" }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_record_milestone() {
        let result = InternalSteps
            .handle("record_milestone", &json!({ "milestone": "kickoff" }))
            .await
            .unwrap();
        assert_eq!(result["milestone"], "kickoff");
        assert!(result["note"].is_null());
    }
}
