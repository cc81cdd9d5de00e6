use super::params::require;
use super::{DispatchError, StepHandler};
use crate::model::ServiceKind;
use crate::Result;
use adapters::ServiceAdapter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Video hosting and processing steps
pub struct VideoSteps {
    adapter: Arc<dyn ServiceAdapter>,
}

impl VideoSteps {
    pub fn new(adapter: Arc<dyn ServiceAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl StepHandler for VideoSteps {
    fn service(&self) -> ServiceKind {
        ServiceKind::Video
    }

    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value> {
        match action {
            "upload_video" | "generate_captions" | "deliver_video" => {
                require(action, parameters, &["video_id"])?;
                Ok(self.adapter.invoke(action, parameters).await?)
            }
            other => Err(DispatchError::unknown_action(self.service(), other).into()),
        }
    }
}
