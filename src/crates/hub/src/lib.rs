//! Workflow orchestration hub for business onboarding
//!
//! The hub defines multi-step business workflows ("form a company", "publish a
//! video with captions", "hold a legal consultation") whose steps are delegated
//! to external service families through [`adapters::ServiceAdapter`]. Steps run
//! strictly in sequence with per-step status tracking and fail-fast failure
//! containment. An independent [`events::EventBus`] carries cross-cutting
//! integration notifications.
//!
//! The pieces, leaf first:
//!
//! - [`dispatch::StepDispatcher`] routes a step's `(service, action)` to its handler group
//! - [`engine::WorkflowEngine`] owns workflow lifecycle and the execution loop
//! - [`store::WorkflowRepository`] persists workflows (in-memory or SQLite)
//! - [`events::EventBus`] publishes and consumes integration events in FIFO order
//! - [`translation::TranslationService`] translates text, video and audio content
//! - [`builders`] assembles the pre-defined business workflows
//! - [`Hub`] wires all of the above from a [`config::HubConfig`]

pub mod api;
pub mod builders;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod hub;
pub mod model;
pub mod store;
pub mod translation;

use thiserror::Error;

pub use dispatch::{DispatchError, StepDispatcher, StepHandler};
pub use engine::{EngineConfig, ExecutionHandle, ExecutionOutcome, ExecutionReport, WorkflowEngine};
pub use events::{EventBus, EventBusConfig, EventHandler};
pub use hub::Hub;
pub use model::{
    ContentType, EventStatus, IntegrationEvent, OwnerProfile, ServiceKind, Step, StepSpec,
    StepStatus, StepUpdate, Translation, TranslationRequest, Workflow, WorkflowStatus,
};
pub use store::{InMemoryRepository, SqliteRepository, WorkflowRepository};
pub use translation::TranslationService;

/// Errors that can occur in the hub
#[derive(Debug, Error)]
pub enum HubError {
    /// Unknown workflow, step or event id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the current workflow or step status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Step could not be routed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// External service call failed
    #[error("Adapter error: {0}")]
    Adapter(#[from] adapters::AdapterError),

    /// Repository failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The execution scheduler is gone
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for HubError {
    fn from(err: sqlx::Error) -> Self {
        HubError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for HubError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        HubError::Storage(format!("Migration failed: {}", err))
    }
}

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Crate version, reported by the health endpoint
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_is_transparent() {
        let err: HubError = DispatchError::UnknownService("payments".to_string()).into();
        assert_eq!(err.to_string(), "Unknown service: payments");
    }

    #[test]
    fn test_adapter_error_keeps_message() {
        let err: HubError = adapters::AdapterError::Provider("filing rejected".to_string()).into();
        assert!(err.to_string().contains("filing rejected"));
    }

    #[test]
    fn test_version_is_set() {
        assert!(!version().is_empty());
    }
}
