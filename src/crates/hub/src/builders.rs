//! Pre-defined business workflows.
//!
//! Each builder turns a typed request into the literal step list for one
//! business scenario, including optional steps only when the request asks for
//! them. The `create_*` entry points on [`WorkflowEngine`] store the result as
//! a pending workflow.

use crate::engine::WorkflowEngine;
use crate::model::{default_language, OwnerProfile, ServiceKind, StepSpec, Workflow};
use crate::{HubError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Form a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessFormationRequest {
    pub business_name: String,
    pub entity_type: String,
    pub state: String,
    pub owner: OwnerProfile,
    /// Also render an ASL video summarizing the formation
    #[serde(default)]
    pub asl_summary: bool,
}

/// Publish a video, optionally captioned and with an ASL rendition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContentRequest {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub owner: OwnerProfile,
    #[serde(default)]
    pub captions: bool,
    #[serde(default)]
    pub caption_language: Option<String>,
    #[serde(default)]
    pub asl_translation: bool,
}

/// Hold a legal consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalConsultationRequest {
    pub topic: String,
    pub owner: OwnerProfile,
    #[serde(default)]
    pub preferred_date: Option<String>,
    /// Language the consultation is held in
    #[serde(default = "default_language")]
    pub consultation_language: String,
    #[serde(default)]
    pub interpreter_requested: bool,
}

fn require_field(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HubError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate, check the name, file, obtain an EIN, draft the operating agreement.
pub fn business_formation_steps(request: &BusinessFormationRequest) -> Vec<StepSpec> {
    let business = json!({
        "business_name": request.business_name,
        "entity_type": request.entity_type,
        "state": request.state,
    });

    let mut steps = vec![
        StepSpec::new("Validate business information", ServiceKind::Internal, "validate_business_info")
            .with_description("Check the business details before anything is filed")
            .with_parameters(business.clone()),
        StepSpec::new("Check name availability", ServiceKind::Formation, "check_name_availability")
            .with_description("Confirm the business name is available in the state")
            .with_parameters(json!({
                "business_name": request.business_name,
                "state": request.state,
            })),
        StepSpec::new("Submit formation documents", ServiceKind::Formation, "submit_formation")
            .with_description("File the formation documents with the state")
            .with_parameters(business),
        StepSpec::new("Obtain EIN", ServiceKind::Formation, "obtain_ein")
            .with_description("Request an employer identification number")
            .with_parameters(json!({
                "business_name": request.business_name,
                "entity_type": request.entity_type,
            })),
        StepSpec::new("Prepare operating agreement", ServiceKind::Legal, "prepare_documents")
            .with_description("Draft the operating agreement for the new entity")
            .with_parameters(json!({
                "document_type": "operating_agreement",
                "business_name": request.business_name,
                "entity_type": request.entity_type,
                "state": request.state,
            })),
    ];

    if request.asl_summary {
        steps.push(
            StepSpec::new("Create ASL summary", ServiceKind::Translation, "generate_asl_video")
                .with_description("Render an ASL video explaining the formation")
                .with_parameters(json!({
                    "source": format!(
                        "Formation of {} as a {} in {}",
                        request.business_name, request.entity_type, request.state
                    ),
                    "content_id": format!("formation-{}", request.business_name),
                })),
        );
    }

    steps
}

/// Upload, optionally caption and sign, then deliver.
pub fn video_content_steps(request: &VideoContentRequest) -> Vec<StepSpec> {
    let mut steps = vec![StepSpec::new("Upload video", ServiceKind::Video, "upload_video")
        .with_description("Upload the source video to the hosting service")
        .with_parameters(json!({
            "video_id": request.video_id,
            "title": request.title,
            "source_url": request.source_url,
        }))];

    if request.captions {
        let language = request
            .caption_language
            .clone()
            .unwrap_or_else(|| request.owner.preferred_language.clone());
        steps.push(
            StepSpec::new("Generate captions", ServiceKind::Video, "generate_captions")
                .with_description("Produce closed captions for the video")
                .with_parameters(json!({
                    "video_id": request.video_id,
                    "language": language,
                })),
        );
    }

    if request.asl_translation {
        steps.push(
            StepSpec::new("Generate ASL translation", ServiceKind::Translation, "generate_asl_video")
                .with_description("Render an ASL interpretation of the video")
                .with_parameters(json!({
                    "source": request.title,
                    "content_id": request.video_id,
                })),
        );
    }

    steps.push(
        StepSpec::new("Deliver video", ServiceKind::Video, "deliver_video")
            .with_description("Publish the video and its renditions")
            .with_parameters(json!({
                "video_id": request.video_id,
                "captions": request.captions,
                "asl_translation": request.asl_translation,
            })),
    );

    steps
}

/// Schedule, arrange an interpreter if needed, consult, summarize, translate.
pub fn legal_consultation_steps(request: &LegalConsultationRequest) -> Vec<StepSpec> {
    let owner = &request.owner;
    let mut steps = vec![StepSpec::new(
        "Schedule consultation",
        ServiceKind::Legal,
        "schedule_consultation",
    )
    .with_description("Book a consultation with an attorney")
    .with_parameters(json!({
        "topic": request.topic,
        "preferred_date": request.preferred_date,
        "language": request.consultation_language,
        "user_id": owner.user_id,
    }))];

    if owner.is_deaf || request.interpreter_requested {
        let language = if owner.is_deaf {
            "ASL".to_string()
        } else {
            owner.preferred_language.clone()
        };
        steps.push(
            StepSpec::new("Schedule interpreter", ServiceKind::Translation, "schedule_interpreter")
                .with_description("Book an interpreter for the consultation")
                .with_parameters(json!({
                    "language": language,
                    "session_type": "legal_consultation",
                    "scheduled_for": request.preferred_date,
                })),
        );
    }

    steps.push(
        StepSpec::new("Conduct consultation", ServiceKind::Legal, "conduct_consultation")
            .with_description("The consultation itself; marked complete once it has taken place")
            .with_parameters(json!({ "topic": request.topic }))
            .requiring_user_action(),
    );

    steps.push(
        StepSpec::new("Generate summary", ServiceKind::Legal, "generate_summary")
            .with_description("Summarize the advice given")
            .with_parameters(json!({
                "topic": request.topic,
                "language": request.consultation_language,
            })),
    );

    if !owner
        .preferred_language
        .eq_ignore_ascii_case(&request.consultation_language)
    {
        steps.push(
            StepSpec::new("Translate summary", ServiceKind::Translation, "translate")
                .with_description("Translate the summary into the owner's language")
                .with_parameters(json!({
                    "content": format!("Consultation summary: {}", request.topic),
                    "source_language": request.consultation_language,
                    "target_language": owner.preferred_language,
                    "content_type": "text",
                })),
        );
    }

    steps
}

fn scenario_metadata(scenario: &str, extra: Value) -> HashMap<String, Value> {
    let mut metadata = HashMap::from([("scenario".to_string(), json!(scenario))]);
    if let Value::Object(map) = extra {
        metadata.extend(map);
    }
    metadata
}

impl WorkflowEngine {
    pub async fn create_business_formation_workflow(
        &self,
        request: BusinessFormationRequest,
    ) -> Result<Workflow> {
        require_field(&request.business_name, "business_name")?;
        require_field(&request.entity_type, "entity_type")?;
        require_field(&request.state, "state")?;

        let steps = business_formation_steps(&request);
        self.create_workflow(
            format!("Business formation: {}", request.business_name),
            format!(
                "Form {} as a {} in {}",
                request.business_name, request.entity_type, request.state
            ),
            steps,
            request.owner,
            scenario_metadata(
                "business_formation",
                json!({ "business_name": request.business_name }),
            ),
        )
        .await
    }

    pub async fn create_video_content_workflow(&self, request: VideoContentRequest) -> Result<Workflow> {
        require_field(&request.video_id, "video_id")?;
        require_field(&request.title, "title")?;

        let steps = video_content_steps(&request);
        self.create_workflow(
            format!("Video content: {}", request.title),
            "Upload and publish a video",
            steps,
            request.owner,
            scenario_metadata("video_content", json!({ "video_id": request.video_id })),
        )
        .await
    }

    pub async fn create_legal_consultation_workflow(
        &self,
        request: LegalConsultationRequest,
    ) -> Result<Workflow> {
        require_field(&request.topic, "topic")?;

        let steps = legal_consultation_steps(&request);
        self.create_workflow(
            format!("Legal consultation: {}", request.topic),
            "Consultation with an attorney",
            steps,
            request.owner,
            scenario_metadata("legal_consultation", json!({ "topic": request.topic })),
        )
        .await
    }
}
