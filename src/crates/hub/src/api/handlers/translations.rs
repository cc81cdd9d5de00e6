//! Translation endpoint handler

use axum::{extract::State, response::IntoResponse, Json};

use crate::api::{error::ApiResult, response, routes::AppState};
use crate::model::TranslationRequest;

/// POST /api/v1/translations
pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslationRequest>,
) -> ApiResult<impl IntoResponse> {
    let translation = state.hub.translate_content(req).await?;

    tracing::info!(
        translation_id = %translation.id,
        content_id = %translation.original.content_id,
        "Content translated"
    );
    Ok(response::ok(translation))
}
