//! Composition root and consumer-facing surface.

use crate::builders::{BusinessFormationRequest, LegalConsultationRequest, VideoContentRequest};
use crate::config::HubConfig;
use crate::dispatch::StepDispatcher;
use crate::engine::{EngineConfig, ExecutionHandle, WorkflowEngine};
use crate::events::{handlers, EventBus};
use crate::model::{
    IntegrationEvent, OwnerProfile, StepSpec, StepUpdate, Translation, TranslationRequest,
    Workflow,
};
use crate::store::{InMemoryRepository, SqliteRepository, WorkflowRepository};
use crate::translation::TranslationService;
use crate::{HubError, Result};
use adapters::{AdapterSet, ServiceFamily};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The wired hub: engine, event bus and translation facility.
#[derive(Clone)]
pub struct Hub {
    engine: WorkflowEngine,
    events: EventBus,
    translation: Arc<TranslationService>,
}

impl Hub {
    /// Build every component from configuration. Must be called inside a
    /// tokio runtime.
    pub async fn from_config(config: &HubConfig) -> Result<Self> {
        let repository: Arc<dyn WorkflowRepository> = match &config.database.url {
            Some(url) => Arc::new(SqliteRepository::connect(url, config.database.max_connections).await?),
            None => {
                tracing::info!("No database configured, keeping workflows in memory");
                Arc::new(InMemoryRepository::new())
            }
        };

        let adapters = AdapterSet::from_config(&config.adapters)
            .map_err(|e| HubError::Config(e.to_string()))?;

        let events = EventBus::builder()
            .handlers(handlers::default_handlers())
            .config(config.events.clone())
            .start();
        Self::with_event_bus(repository, adapters, config.engine.clone(), events)
    }

    /// Build from explicit parts, with the default event handler table.
    pub fn with_components(
        repository: Arc<dyn WorkflowRepository>,
        adapters: AdapterSet,
        engine_config: EngineConfig,
    ) -> Result<Self> {
        let events = EventBus::builder()
            .handlers(handlers::default_handlers())
            .start();
        Self::with_event_bus(repository, adapters, engine_config, events)
    }

    /// Build from explicit parts and an already started event bus.
    pub fn with_event_bus(
        repository: Arc<dyn WorkflowRepository>,
        adapters: AdapterSet,
        engine_config: EngineConfig,
        events: EventBus,
    ) -> Result<Self> {
        let translation_adapter = adapters.get(ServiceFamily::Translation).ok_or_else(|| {
            HubError::Config("No adapter configured for translation service".to_string())
        })?;
        let translation = Arc::new(TranslationService::new(translation_adapter));
        let dispatcher = Arc::new(StepDispatcher::from_adapters(&adapters, translation.clone())?);

        let engine = WorkflowEngine::new(repository, dispatcher, engine_config)
            .with_event_bus(events.clone());

        tracing::info!(?adapters, "Hub assembled");
        Ok(Self {
            engine,
            events,
            translation,
        })
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn create_workflow(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<StepSpec>,
        owner: OwnerProfile,
        metadata: HashMap<String, Value>,
    ) -> Result<Workflow> {
        self.engine
            .create_workflow(name, description, steps, owner, metadata)
            .await
    }

    pub async fn get_workflow(&self, id: Uuid) -> Result<Workflow> {
        self.engine.get_workflow(id).await
    }

    pub async fn list_active(&self) -> Result<Vec<Workflow>> {
        self.engine.list_active().await
    }

    pub async fn update_workflow_step(
        &self,
        workflow_id: Uuid,
        step_id: Uuid,
        update: StepUpdate,
    ) -> Result<Workflow> {
        self.engine
            .update_workflow_step(workflow_id, step_id, update)
            .await
    }

    pub async fn start_workflow(&self, id: Uuid) -> Result<Workflow> {
        self.engine.start_workflow(id).await
    }

    pub async fn start_workflow_tracked(&self, id: Uuid) -> Result<(Workflow, ExecutionHandle)> {
        self.engine.start_workflow_tracked(id).await
    }

    pub async fn resume_active(&self) -> Result<usize> {
        self.engine.resume_active().await
    }

    /// Translate one content unit and announce it with a
    /// `translation_completed` event.
    pub async fn translate_content(&self, request: TranslationRequest) -> Result<Translation> {
        let translation = self.translation.translate(request).await?;

        self.events.publish(
            "translation_completed",
            "translation_service",
            json!({
                "translation_id": translation.id,
                "content_id": translation.original.content_id,
                "content_type": translation.original.content_type,
                "target_language": translation.translations.first().map(|t| t.language.clone()),
            }),
        );
        Ok(translation)
    }

    pub fn publish_event(
        &self,
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: Value,
    ) -> IntegrationEvent {
        self.events.publish(event_type, source, data)
    }

    pub fn get_event(&self, id: &Uuid) -> Option<IntegrationEvent> {
        self.events.get_event(id)
    }

    pub async fn create_business_formation_workflow(
        &self,
        request: BusinessFormationRequest,
    ) -> Result<Workflow> {
        self.engine.create_business_formation_workflow(request).await
    }

    pub async fn create_video_content_workflow(&self, request: VideoContentRequest) -> Result<Workflow> {
        self.engine.create_video_content_workflow(request).await
    }

    pub async fn create_legal_consultation_workflow(
        &self,
        request: LegalConsultationRequest,
    ) -> Result<Workflow> {
        self.engine.create_legal_consultation_workflow(request).await
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("engine", &self.engine)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, EventStatus};

    #[tokio::test]
    async fn test_default_config_builds_mocked_hub() {
        let hub = Hub::from_config(&HubConfig::default()).await.unwrap();
        assert!(hub.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_content_announces_completion() {
        let hub = Hub::from_config(&HubConfig::default()).await.unwrap();
        let mut processed = hub.events().subscribe_processed();

        let translation = hub
            .translate_content(TranslationRequest::new("Hi", "English", "ASL", ContentType::Text))
            .await
            .unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), processed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type, "translation_completed");
        assert_eq!(event.status, EventStatus::Processed);
        assert_eq!(event.data["translation_id"], json!(translation.id));
    }
}
