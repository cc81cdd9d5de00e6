//! Data model: workflows and their steps, integration events, translations.

mod event;
mod translation;
mod workflow;

pub use event::{EventStatus, IntegrationEvent};
pub use translation::{
    ContentType, OriginalContent, Translation, TranslationEntry, TranslationRequest,
    TranslationStatus,
};
pub use workflow::{
    OwnerProfile, ServiceKind, Step, StepSpec, StepStatus, StepUpdate, Workflow, WorkflowStatus,
};

pub(crate) use workflow::default_language;
