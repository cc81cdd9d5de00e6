//! Event handlers and the default handler table.

use crate::model::IntegrationEvent;
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Processes events of one type
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event, returning the result recorded on it.
    async fn handle(&self, event: &IntegrationEvent) -> Result<Value>;
}

/// Handler backed by a synchronous closure
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&IntegrationEvent) -> Result<Value> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&IntegrationEvent) -> Result<Value> + Send + Sync,
{
    async fn handle(&self, event: &IntegrationEvent) -> Result<Value> {
        (self.f)(event)
    }
}

/// Logs the event and acknowledges it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeHandler;

#[async_trait]
impl EventHandler for AcknowledgeHandler {
    async fn handle(&self, event: &IntegrationEvent) -> Result<Value> {
        tracing::info!(
            event_type = %event.event_type,
            source = %event.source,
            "Integration event acknowledged"
        );

        let mut result = json!({
            "acknowledged": true,
            "event_type": event.event_type,
            "handled_at": Utc::now().to_rfc3339(),
        });
        if let Some(workflow_id) = event.data.get("workflow_id") {
            result["workflow_id"] = workflow_id.clone();
        }
        Ok(result)
    }
}

/// Event types acknowledged by the default table
pub const DEFAULT_EVENT_TYPES: &[&str] = &[
    "workflow_started",
    "workflow_completed",
    "workflow_failed",
    "formation_submitted",
    "consultation_scheduled",
    "video_published",
    "translation_completed",
];

/// The handler table the hub starts with.
pub fn default_handlers() -> Vec<(String, Arc<dyn EventHandler>)> {
    let ack: Arc<dyn EventHandler> = Arc::new(AcknowledgeHandler);
    DEFAULT_EVENT_TYPES
        .iter()
        .map(|event_type| (event_type.to_string(), ack.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acknowledge_copies_workflow_id() {
        let event = IntegrationEvent::new(
            "workflow_completed",
            "workflow_engine",
            json!({ "workflow_id": "wf-1" }),
        );
        let result = AcknowledgeHandler.handle(&event).await.unwrap();

        assert_eq!(result["acknowledged"], true);
        assert_eq!(result["workflow_id"], "wf-1");
    }

    #[test]
    fn test_default_table_covers_lifecycle_events() {
        let table = default_handlers();
        assert_eq!(table.len(), DEFAULT_EVENT_TYPES.len());
        assert!(table.iter().any(|(t, _)| t == "workflow_failed"));
    }
}
