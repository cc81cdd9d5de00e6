//! REST API for the hub
//!
//! - Workflow creation, inspection, start and step updates
//! - The three pre-defined business workflows
//! - Content translation
//! - Integration event publication and lookup
//!
//! Successful responses use the `{ "success": true, "data": ... }` envelope;
//! errors are rendered by [`ApiError`].

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use middleware::{cors_layer, logging_layer};
pub use response::SuccessResponse;
pub use routes::{create_router, AppState};
