use super::params::require;
use super::{DispatchError, StepHandler};
use crate::model::ServiceKind;
use crate::Result;
use adapters::ServiceAdapter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Legal-services steps
pub struct LegalSteps {
    adapter: Arc<dyn ServiceAdapter>,
}

impl LegalSteps {
    pub fn new(adapter: Arc<dyn ServiceAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl StepHandler for LegalSteps {
    fn service(&self) -> ServiceKind {
        ServiceKind::Legal
    }

    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value> {
        let required: &[&str] = match action {
            "schedule_consultation" | "conduct_consultation" | "generate_summary" => &["topic"],
            "prepare_documents" => &["document_type"],
            other => return Err(DispatchError::unknown_action(self.service(), other).into()),
        };
        require(action, parameters, required)?;

        Ok(self.adapter.invoke(action, parameters).await?)
    }
}
