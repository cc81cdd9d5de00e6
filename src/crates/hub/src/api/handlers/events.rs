//! Integration event endpoint handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::api::{
    error::{ApiError, ApiResult},
    models::PublishEventRequest,
    response,
    routes::AppState,
};

/// POST /api/v1/events
///
/// Answers 202 with the pending event; handlers run asynchronously.
pub async fn publish_event(
    State(state): State<AppState>,
    Json(req): Json<PublishEventRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let event = state.hub.publish_event(req.event_type, req.source, req.data);
    Ok(response::accepted(event))
}

/// GET /api/v1/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .hub
        .get_event(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Event {}", id)))?;
    Ok(response::ok(event))
}
