//! API route definitions

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::api::{handlers, middleware};
use crate::hub::Hub;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub hub: Hub,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }
}

/// Build the complete API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Workflow endpoints
        .route(
            "/api/v1/workflows",
            post(handlers::create_workflow).get(handlers::list_active_workflows),
        )
        .route(
            "/api/v1/workflows/business-formation",
            post(handlers::create_business_formation),
        )
        .route(
            "/api/v1/workflows/video-content",
            post(handlers::create_video_content),
        )
        .route(
            "/api/v1/workflows/legal-consultation",
            post(handlers::create_legal_consultation),
        )
        .route("/api/v1/workflows/:id", get(handlers::get_workflow))
        .route("/api/v1/workflows/:id/start", post(handlers::start_workflow))
        .route(
            "/api/v1/workflows/:id/steps/:step_id",
            patch(handlers::update_workflow_step),
        )
        // Translation and event endpoints
        .route("/api/v1/translations", post(handlers::translate))
        .route("/api/v1/events", post(handlers::publish_event))
        .route("/api/v1/events/:id", get(handlers::get_event))
        .layer(middleware::logging_layer())
        .layer(middleware::cors_layer())
        .with_state(state)
}
