mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::mocked_hub;
use hub::api::{create_router, AppState};
use hub::{ExecutionOutcome, Hub};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

fn router(hub: Hub) -> Router {
    create_router(AppState::new(hub))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = router(mocked_hub());
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["active_workflows"], 0);
}

#[tokio::test]
async fn test_create_start_and_fetch_workflow() {
    let hub = mocked_hub();
    let mut reports = hub.engine().subscribe();
    let app = router(hub);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workflows",
        Some(json!({
            "name": "Kickoff",
            "steps": [
                { "name": "Kickoff", "service": "internal", "action": "record_milestone",
                  "parameters": { "milestone": "kickoff" } }
            ],
            "owner": { "user_id": "user-9" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/v1/workflows", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::POST, &format!("/api/v1/workflows/{}/start", id), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["status"], "active");

    let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.outcome, ExecutionOutcome::Completed);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/workflows/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["steps"][0]["result"]["milestone"], "kickoff");

    // A second start conflicts
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/workflows/{}/start", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unknown_workflow_is_404() {
    let app = router(mocked_hub());
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/workflows/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_workflow_validation() {
    let app = router(mocked_hub());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workflows",
        Some(json!({ "name": "", "steps": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_business_formation_route_and_step_update() {
    let app = router(mocked_hub());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workflows/business-formation",
        Some(json!({
            "business_name": "Acme Widgets",
            "entity_type": "llc",
            "state": "CA",
            "owner": { "user_id": "user-3", "is_deaf": true, "preferred_language": "ASL" },
            "asl_summary": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 6);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let step_id = body["data"]["steps"][5]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/workflows/{}/steps/{}", id, step_id),
        Some(json!({ "status": "skipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["steps"][5]["status"], "skipped");
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn test_video_and_legal_routes() {
    let app = router(mocked_hub());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workflows/video-content",
        Some(json!({ "video_id": "vid-1", "title": "Intro", "owner": { "user_id": "u" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workflows/legal-consultation",
        Some(json!({ "topic": "", "owner": { "user_id": "u" } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_translation_route() {
    let app = router(mocked_hub());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/translations",
        Some(json!({ "content": "Hello", "target_language": "ASL" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["translations"][0]["format"], "text");
}

#[tokio::test]
async fn test_publish_and_fetch_event() {
    let hub = mocked_hub();
    let mut processed = hub.events().subscribe_processed();
    let app = router(hub);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(json!({ "event_type": "video_published", "data": { "video_id": "vid-1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["source"], "api");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    tokio::time::timeout(Duration::from_secs(5), processed.recv())
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/events/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "processed");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/events/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
