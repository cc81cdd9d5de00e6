//! API request handlers, one module per resource

pub mod events;
pub mod health;
pub mod translations;
pub mod workflows;

pub use events::{get_event, publish_event};
pub use health::health;
pub use translations::translate;
pub use workflows::{
    create_business_formation, create_legal_consultation, create_video_content, create_workflow,
    get_workflow, list_active_workflows, start_workflow, update_workflow_step,
};
