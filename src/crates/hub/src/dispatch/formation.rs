use super::params::require;
use super::{DispatchError, StepHandler};
use crate::model::ServiceKind;
use crate::Result;
use adapters::ServiceAdapter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Business-formation filing steps
pub struct FormationSteps {
    adapter: Arc<dyn ServiceAdapter>,
}

impl FormationSteps {
    pub fn new(adapter: Arc<dyn ServiceAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl StepHandler for FormationSteps {
    fn service(&self) -> ServiceKind {
        ServiceKind::Formation
    }

    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value> {
        match action {
            "check_name_availability" | "obtain_ein" => {
                require(action, parameters, &["business_name"])?
            }
            "submit_formation" => {
                require(action, parameters, &["business_name", "entity_type", "state"])?
            }
            "register_state_tax" => require(action, parameters, &["business_name", "state"])?,
            other => return Err(DispatchError::unknown_action(self.service(), other).into()),
        }

        Ok(self.adapter.invoke(action, parameters).await?)
    }
}
