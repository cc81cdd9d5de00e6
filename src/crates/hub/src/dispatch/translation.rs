use super::params::{optional_str, require, require_str};
use super::{DispatchError, StepHandler};
use crate::model::{ContentType, ServiceKind, TranslationRequest};
use crate::translation::TranslationService;
use crate::{HubError, Result};
use adapters::ServiceAdapter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Translation and interpreter steps.
///
/// `translate` goes through the [`TranslationService`] so a workflow step
/// produces the same `Translation` record a direct caller would get.
pub struct TranslationSteps {
    adapter: Arc<dyn ServiceAdapter>,
    translation: Arc<TranslationService>,
}

impl TranslationSteps {
    pub fn new(adapter: Arc<dyn ServiceAdapter>, translation: Arc<TranslationService>) -> Self {
        Self {
            adapter,
            translation,
        }
    }

    async fn translate(&self, action: &str, parameters: &Value) -> Result<Value> {
        let content = require_str(action, parameters, "content")?;
        let target = require_str(action, parameters, "target_language")?;
        let content_type = match parameters.get("content_type") {
            Some(value) => serde_json::from_value::<ContentType>(value.clone()).map_err(|e| {
                HubError::InvalidInput(format!("Invalid content_type: {}", e))
            })?,
            None => ContentType::Text,
        };

        let mut request = TranslationRequest::new(
            content,
            optional_str(parameters, "source_language").unwrap_or("English"),
            target,
            content_type,
        );
        if let Some(content_id) = optional_str(parameters, "content_id") {
            request = request.with_content_id(content_id);
        }

        let translation = self.translation.translate(request).await?;
        Ok(serde_json::to_value(translation)?)
    }
}

#[async_trait]
impl StepHandler for TranslationSteps {
    fn service(&self) -> ServiceKind {
        ServiceKind::Translation
    }

    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value> {
        match action {
            "translate" => self.translate(action, parameters).await,
            "schedule_interpreter" => {
                require(action, parameters, &["language"])?;
                Ok(self.adapter.invoke(action, parameters).await?)
            }
            "generate_asl_video" => {
                require(action, parameters, &["source"])?;
                Ok(self.adapter.invoke(action, parameters).await?)
            }
            other => Err(DispatchError::unknown_action(self.service(), other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapters::{MockAdapter, ServiceFamily};
    use serde_json::json;

    fn steps() -> TranslationSteps {
        let adapter: Arc<dyn ServiceAdapter> = Arc::new(MockAdapter::new(ServiceFamily::Translation));
        TranslationSteps::new(adapter.clone(), Arc::new(TranslationService::new(adapter)))
    }

    #[tokio::test]
    async fn test_translate_step_returns_translation_record() {
        let result = steps()
            .handle(
                "translate",
                &json!({ "content": "Your filing was accepted", "target_language": "ASL" }),
            )
            .await
            .unwrap();

        assert_eq!(result["status"], "completed");
        assert_eq!(result["translations"][0]["format"], "text");
        assert_eq!(
            result["translations"][0]["content"],
            "YOUR FILING WAS ACCEPTED"
        );
    }

    #[tokio::test]
    async fn test_bad_content_type() {
        let err = steps()
            .handle(
                "translate",
                &json!({ "content": "x", "target_language": "ASL", "content_type": "hologram" }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidInput(_)));
    }
}
