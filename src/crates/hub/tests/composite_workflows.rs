mod common;

use common::{mocked_hub, owner};
use hub::builders::{
    legal_consultation_steps, video_content_steps, LegalConsultationRequest, VideoContentRequest,
};
use hub::{ExecutionOutcome, HubError, OwnerProfile, ServiceKind, StepStatus, WorkflowStatus};

fn video_request(captions: bool, asl_translation: bool) -> VideoContentRequest {
    VideoContentRequest {
        video_id: "vid-42".to_string(),
        title: "Quarterly update".to_string(),
        source_url: Some("https://cdn.example/raw/vid-42.mov".to_string()),
        owner: owner(),
        captions,
        caption_language: None,
        asl_translation,
    }
}

fn actions(steps: &[hub::StepSpec]) -> Vec<&str> {
    steps.iter().map(|s| s.action.as_str()).collect()
}

#[tokio::test]
async fn test_video_without_options_has_two_steps() {
    let hub = mocked_hub();
    let workflow = hub
        .create_video_content_workflow(video_request(false, false))
        .await
        .unwrap();

    let actions: Vec<_> = workflow.steps.iter().map(|s| s.action.as_str()).collect();
    assert_eq!(actions, vec!["upload_video", "deliver_video"]);
    assert_eq!(workflow.metadata["scenario"], "video_content");
}

#[test]
fn test_video_with_all_options() {
    let steps = video_content_steps(&video_request(true, true));
    assert_eq!(
        actions(&steps),
        vec!["upload_video", "generate_captions", "generate_asl_video", "deliver_video"]
    );
    // Captions default to the owner's language
    assert_eq!(steps[1].parameters["language"], "English");
    assert_eq!(steps[2].service, ServiceKind::Translation);
}

#[tokio::test]
async fn test_video_workflow_delivers() {
    let hub = mocked_hub();
    let workflow = hub
        .create_video_content_workflow(video_request(true, true))
        .await
        .unwrap();

    let (_, handle) = hub.start_workflow_tracked(workflow.id).await.unwrap();
    assert_eq!(handle.wait().await.unwrap(), ExecutionOutcome::Completed);

    let done = hub.get_workflow(workflow.id).await.unwrap();
    let delivered = done.steps.last().and_then(|s| s.result.clone()).unwrap();
    assert_eq!(delivered["status"], "published");
}

#[test]
fn test_deaf_owner_gets_asl_interpreter() {
    let steps = legal_consultation_steps(&LegalConsultationRequest {
        topic: "Lease review".to_string(),
        owner: OwnerProfile::new("user-2").deaf().with_language("ASL"),
        preferred_date: Some("2026-11-02".to_string()),
        consultation_language: "English".to_string(),
        interpreter_requested: false,
    });

    assert_eq!(
        actions(&steps),
        vec![
            "schedule_consultation",
            "schedule_interpreter",
            "conduct_consultation",
            "generate_summary",
            "translate",
        ]
    );
    assert_eq!(steps[1].parameters["language"], "ASL");
    assert!(steps[2].requires_user_action);
    assert_eq!(steps[4].parameters["target_language"], "ASL");
}

#[test]
fn test_hearing_owner_in_consultation_language_has_no_optional_steps() {
    let steps = legal_consultation_steps(&LegalConsultationRequest {
        topic: "Lease review".to_string(),
        owner: owner(),
        preferred_date: None,
        consultation_language: "english".to_string(),
        interpreter_requested: false,
    });

    assert_eq!(
        actions(&steps),
        vec!["schedule_consultation", "conduct_consultation", "generate_summary"]
    );
}

#[tokio::test]
async fn test_builder_rejects_missing_fields() {
    let hub = mocked_hub();
    let mut request = video_request(false, false);
    request.video_id = "  ".to_string();

    let err = hub.create_video_content_workflow(request).await.unwrap_err();
    assert!(matches!(err, HubError::InvalidInput(_)));
}

#[tokio::test]
async fn test_invalid_entity_type_fails_first_step() {
    let hub = mocked_hub();
    let workflow = hub
        .create_business_formation_workflow(hub::builders::BusinessFormationRequest {
            business_name: "Acme".to_string(),
            entity_type: "guild".to_string(),
            state: "CA".to_string(),
            owner: owner(),
            asl_summary: true,
        })
        .await
        .unwrap();
    assert_eq!(workflow.steps.len(), 6);

    let (_, handle) = hub.start_workflow_tracked(workflow.id).await.unwrap();
    let outcome = handle.wait().await.unwrap();
    assert!(matches!(outcome, ExecutionOutcome::Failed { .. }));

    let after = hub.get_workflow(workflow.id).await.unwrap();
    assert_eq!(after.status, WorkflowStatus::Failed);
    assert_eq!(after.steps[0].status, StepStatus::Failed);
    assert!(after.steps[1..].iter().all(|s| s.status == StepStatus::Pending));
}
