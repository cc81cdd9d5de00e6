use super::WorkflowRepository;
use crate::model::{Workflow, WorkflowStatus};
use crate::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory repository for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    workflows: RwLock<HashMap<Uuid, Workflow>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.workflows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.read().is_empty()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryRepository {
    async fn save(&self, workflow: &Workflow) -> Result<()> {
        self.workflows.write().insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().get(id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Workflow>> {
        let mut active: Vec<Workflow> = self
            .workflows
            .read()
            .values()
            .filter(|w| matches!(w.status, WorkflowStatus::Pending | WorkflowStatus::Active))
            .cloned()
            .collect();
        active.sort_by_key(|w| w.created_at);
        Ok(active)
    }
}
