//! Health check endpoint handler

use axum::{extract::State, response::IntoResponse};

use crate::api::{error::ApiResult, models::HealthResponse, response, routes::AppState};

/// GET /health
///
/// Also reads the repository, so a broken database surfaces as a 500.
pub async fn health(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let active = state.hub.list_active().await?;
    Ok(response::ok(HealthResponse::new("ok", active.len())))
}
