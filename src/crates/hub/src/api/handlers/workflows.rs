//! Workflow endpoint handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::api::{error::ApiResult, models::CreateWorkflowRequest, response, routes::AppState};
use crate::builders::{BusinessFormationRequest, LegalConsultationRequest, VideoContentRequest};
use crate::model::StepUpdate;

/// POST /api/v1/workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkflowRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let workflow = state
        .hub
        .create_workflow(req.name, req.description, req.steps, req.owner, req.metadata)
        .await?;
    Ok(response::created(workflow))
}

/// GET /api/v1/workflows
///
/// Pending and active workflows only.
pub async fn list_active_workflows(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let workflows = state.hub.list_active().await?;
    Ok(response::ok(workflows))
}

/// GET /api/v1/workflows/:id
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.get_workflow(id).await?;
    Ok(response::ok(workflow))
}

/// POST /api/v1/workflows/:id/start
///
/// Returns the snapshot taken right after activation; steps run in the
/// background.
pub async fn start_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.start_workflow(id).await?;
    Ok(response::accepted(workflow))
}

/// PATCH /api/v1/workflows/:id/steps/:step_id
pub async fn update_workflow_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<StepUpdate>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.update_workflow_step(id, step_id, update).await?;
    Ok(response::ok(workflow))
}

/// POST /api/v1/workflows/business-formation
pub async fn create_business_formation(
    State(state): State<AppState>,
    Json(req): Json<BusinessFormationRequest>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.create_business_formation_workflow(req).await?;
    Ok(response::created(workflow))
}

/// POST /api/v1/workflows/video-content
pub async fn create_video_content(
    State(state): State<AppState>,
    Json(req): Json<VideoContentRequest>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.create_video_content_workflow(req).await?;
    Ok(response::created(workflow))
}

/// POST /api/v1/workflows/legal-consultation
pub async fn create_legal_consultation(
    State(state): State<AppState>,
    Json(req): Json<LegalConsultationRequest>,
) -> ApiResult<impl IntoResponse> {
    let workflow = state.hub.create_legal_consultation_workflow(req).await?;
    Ok(response::created(workflow))
}
