//! Workflow persistence.
//!
//! The engine only talks to [`WorkflowRepository`]; whether workflows survive a
//! restart is a property of the implementation it is given.

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use crate::model::Workflow;
use crate::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for workflows and their steps
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Insert or replace a workflow.
    async fn save(&self, workflow: &Workflow) -> Result<()>;

    async fn get(&self, id: &Uuid) -> Result<Option<Workflow>>;

    /// Pending and active workflows, oldest first.
    async fn list_active(&self) -> Result<Vec<Workflow>>;
}
