//! Step dispatch: routes a step's `(service, action)` to the handler group
//! that performs it.
//!
//! Each service has one [`StepHandler`]. Adapter-backed groups validate the
//! parameters their actions need and forward the call to the family's
//! [`ServiceAdapter`](adapters::ServiceAdapter); the `internal` group evaluates
//! business-logic steps in-process.

mod formation;
mod internal;
mod legal;
mod params;
mod translation;
mod video;

pub use formation::FormationSteps;
pub use internal::InternalSteps;
pub use legal::LegalSteps;
pub use translation::TranslationSteps;
pub use video::VideoSteps;

use crate::model::{ServiceKind, Step};
use crate::translation::TranslationService;
use crate::{HubError, Result};
use adapters::{AdapterSet, ServiceAdapter, ServiceFamily};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Routing failures
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Unknown action '{action}' for service {service}")]
    UnknownAction { service: String, action: String },

    #[error("Action '{action}' requires parameter '{name}'")]
    MissingParameter { action: String, name: String },
}

impl DispatchError {
    pub(crate) fn unknown_action(service: ServiceKind, action: &str) -> Self {
        DispatchError::UnknownAction {
            service: service.to_string(),
            action: action.to_string(),
        }
    }
}

/// Handler group for one service
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// The service this group serves
    fn service(&self) -> ServiceKind;

    /// Perform `action`, failing with [`DispatchError::UnknownAction`] for
    /// actions outside the group.
    async fn handle(&self, action: &str, parameters: &Value) -> Result<Value>;
}

/// Routes steps to their handler group
#[derive(Clone, Default)]
pub struct StepDispatcher {
    handlers: HashMap<ServiceKind, Arc<dyn StepHandler>>,
}

impl StepDispatcher {
    /// Dispatcher with no handler groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every group, backed by the adapters of `set`.
    pub fn from_adapters(set: &AdapterSet, translation: Arc<TranslationService>) -> Result<Self> {
        let adapter = |family: ServiceFamily| -> Result<Arc<dyn ServiceAdapter>> {
            set.get(family).ok_or_else(|| {
                HubError::Config(format!("No adapter configured for {} service", family))
            })
        };

        Ok(Self::new()
            .register(Arc::new(FormationSteps::new(adapter(ServiceFamily::Formation)?)))
            .register(Arc::new(LegalSteps::new(adapter(ServiceFamily::Legal)?)))
            .register(Arc::new(VideoSteps::new(adapter(ServiceFamily::Video)?)))
            .register(Arc::new(TranslationSteps::new(
                adapter(ServiceFamily::Translation)?,
                translation,
            )))
            .register(Arc::new(InternalSteps)))
    }

    /// Install (or replace) the group for its service.
    pub fn register(mut self, handler: Arc<dyn StepHandler>) -> Self {
        self.handlers.insert(handler.service(), handler);
        self
    }

    pub fn supports(&self, service: ServiceKind) -> bool {
        self.handlers.contains_key(&service)
    }

    pub async fn dispatch(&self, step: &Step) -> Result<Value> {
        let handler = self
            .handlers
            .get(&step.service)
            .ok_or_else(|| DispatchError::UnknownService(step.service.to_string()))?;

        tracing::debug!(
            step_id = %step.id,
            service = %step.service,
            action = %step.action,
            "Dispatching step"
        );

        handler.handle(&step.action, &step.parameters).await
    }
}

impl std::fmt::Debug for StepDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<_> = self.handlers.keys().map(|s| s.as_str()).collect();
        services.sort_unstable();
        f.debug_struct("StepDispatcher").field("services", &services).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepSpec;
    use serde_json::json;

    fn dispatcher() -> StepDispatcher {
        let set = AdapterSet::mocked();
        let translation = Arc::new(TranslationService::new(
            set.get(ServiceFamily::Translation).unwrap(),
        ));
        StepDispatcher::from_adapters(&set, translation).unwrap()
    }

    fn step(service: ServiceKind, action: &str, parameters: Value) -> Step {
        StepSpec::new("test", service, action)
            .with_parameters(parameters)
            .into()
    }

    #[tokio::test]
    async fn test_routes_to_adapter() {
        let result = dispatcher()
            .dispatch(&step(
                ServiceKind::Formation,
                "submit_formation",
                json!({ "business_name": "Acme", "entity_type": "llc", "state": "DE" }),
            ))
            .await
            .unwrap();

        assert_eq!(result["status"], "submitted");
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let err = StepDispatcher::new()
            .dispatch(&step(ServiceKind::Video, "upload_video", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HubError::Dispatch(DispatchError::UnknownService(ref s)) if s == "video"
        ));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let err = dispatcher()
            .dispatch(&step(ServiceKind::Legal, "file_lawsuit", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HubError::Dispatch(DispatchError::UnknownAction { ref service, ref action })
                if service == "legal" && action == "file_lawsuit"
        ));
    }

    #[tokio::test]
    async fn test_missing_parameter() {
        let err = dispatcher()
            .dispatch(&step(ServiceKind::Video, "deliver_video", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HubError::Dispatch(DispatchError::MissingParameter { ref name, .. }) if name == "video_id"
        ));
    }

    #[test]
    fn test_from_adapters_requires_every_family() {
        let set = AdapterSet::new();
        let translation = Arc::new(TranslationService::new(Arc::new(
            adapters::MockAdapter::new(ServiceFamily::Translation),
        )));

        let err = StepDispatcher::from_adapters(&set, translation).unwrap_err();
        assert!(matches!(err, HubError::Config(_)));
    }

    #[test]
    fn test_supports_registered_services() {
        let d = dispatcher();
        assert!(d.supports(ServiceKind::Internal));
        assert!(d.supports(ServiceKind::Translation));
        assert!(!StepDispatcher::new().supports(ServiceKind::Internal));
    }
}
