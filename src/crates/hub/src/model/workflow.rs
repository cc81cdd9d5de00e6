use crate::{HubError, Result};
use adapters::ServiceFamily;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Workflow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Created, not started
    Pending,
    /// Execution loop owns the workflow
    Active,
    /// Every step completed or skipped
    Completed,
    /// A step failed
    Failed,
}

impl WorkflowStatus {
    /// Completed and failed workflows accept no further step transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Active => "active",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(WorkflowStatus::Pending),
            "active" => Ok(WorkflowStatus::Active),
            "completed" => Ok(WorkflowStatus::Completed),
            "failed" => Ok(WorkflowStatus::Failed),
            other => Err(HubError::InvalidInput(format!("Unknown workflow status: {}", other))),
        }
    }
}

/// Step lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    /// Completed or skipped; counts toward workflow completion.
    pub fn is_done(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Which handler group a step is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Formation,
    Legal,
    Video,
    Translation,
    /// Business-logic steps evaluated in-process
    Internal,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Formation => "formation",
            ServiceKind::Legal => "legal",
            ServiceKind::Video => "video",
            ServiceKind::Translation => "translation",
            ServiceKind::Internal => "internal",
        }
    }

    /// External service family backing this kind, if any.
    pub fn family(&self) -> Option<ServiceFamily> {
        match self {
            ServiceKind::Formation => Some(ServiceFamily::Formation),
            ServiceKind::Legal => Some(ServiceFamily::Legal),
            ServiceKind::Video => Some(ServiceFamily::Video),
            ServiceKind::Translation => Some(ServiceFamily::Translation),
            ServiceKind::Internal => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "formation" => Ok(ServiceKind::Formation),
            "legal" => Ok(ServiceKind::Legal),
            "video" => Ok(ServiceKind::Video),
            "translation" => Ok(ServiceKind::Translation),
            "internal" => Ok(ServiceKind::Internal),
            other => Err(HubError::InvalidInput(format!("Unknown service: {}", other))),
        }
    }
}

/// Owner and accessibility profile of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub user_id: String,
    #[serde(default)]
    pub is_deaf: bool,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default)]
    pub communication_preferences: HashMap<String, Value>,
}

impl Default for OwnerProfile {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            is_deaf: false,
            preferred_language: default_language(),
            communication_preferences: HashMap::new(),
        }
    }
}

impl OwnerProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn deaf(mut self) -> Self {
        self.is_deaf = true;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    pub fn with_preference(mut self, key: impl Into<String>, value: Value) -> Self {
        self.communication_preferences.insert(key.into(), value);
        self
    }
}

pub(crate) fn default_language() -> String {
    "English".to_string()
}

/// Template for one step, as passed to workflow creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub service: ServiceKind,
    pub action: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(default)]
    pub requires_user_action: bool,
}

impl StepSpec {
    pub fn new(name: impl Into<String>, service: ServiceKind, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            service,
            action: action.into(),
            parameters: empty_object(),
            requires_user_action: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Mark the step as completed out-of-band by a person.
    pub fn requiring_user_action(mut self) -> Self {
        self.requires_user_action = true;
        self
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// One unit of work inside a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: StepStatus,
    pub service: ServiceKind,
    pub action: String,
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requires_user_action: bool,
}

impl From<StepSpec> for Step {
    fn from(spec: StepSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: spec.name,
            description: spec.description,
            status: StepStatus::Pending,
            service: spec.service,
            action: spec.action,
            parameters: spec.parameters,
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
            requires_user_action: spec.requires_user_action,
        }
    }
}

/// Field-level update of one step; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepUpdate {
    pub status: Option<StepStatus>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub parameters: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub requires_user_action: Option<bool>,
}

impl StepUpdate {
    pub fn status(status: StepStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn completed(result: Value) -> Self {
        Self {
            status: Some(StepStatus::Completed),
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(StepStatus::Failed),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// What happened to a workflow after a step update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UpdateEffect {
    /// The next step was activated and the execution loop should resume.
    pub resume: bool,
    /// The workflow reached a terminal status in this update.
    pub became_terminal: bool,
}

/// An ordered, named sequence of steps for one business process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub owner: OwnerProfile,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub steps: Vec<Step>,
}

impl Workflow {
    /// Build a pending workflow; every step starts `pending`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        specs: Vec<StepSpec>,
        owner: OwnerProfile,
        metadata: HashMap<String, Value>,
    ) -> Result<Self> {
        if specs.is_empty() {
            return Err(HubError::InvalidInput(
                "A workflow needs at least one step".to_string(),
            ));
        }
        if let Some(spec) = specs.iter().find(|s| s.action.trim().is_empty()) {
            return Err(HubError::InvalidInput(format!(
                "Step '{}' has no action",
                spec.name
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            status: WorkflowStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
            owner,
            metadata,
            steps: specs.into_iter().map(Step::from).collect(),
        })
    }

    pub fn step(&self, step_id: Uuid) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// The step currently `in_progress`, if any
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.iter().find(|s| s.status == StepStatus::InProgress)
    }

    pub fn in_progress_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::InProgress)
            .count()
    }

    /// Every step completed or skipped
    pub fn all_steps_done(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_done())
    }

    fn step_index(&self, step_id: Uuid) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| {
                HubError::NotFound(format!("Step {} in workflow {}", step_id, self.id))
            })
    }

    fn ensure_not_terminal(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(HubError::InvalidState(format!(
                "Workflow {} is {}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// `pending -> active`, first step `in_progress`.
    pub(crate) fn start(&mut self) -> Result<()> {
        if self.status != WorkflowStatus::Pending {
            return Err(HubError::InvalidState(format!(
                "Workflow {} cannot start from status {}",
                self.id, self.status
            )));
        }

        let now = Utc::now();
        self.status = WorkflowStatus::Active;
        self.updated_at = now;

        // Steps skipped or finished before the start are left alone.
        if self.current_step().is_none() {
            if let Some(first) = self
                .steps
                .iter_mut()
                .find(|s| s.status == StepStatus::Pending)
            {
                first.status = StepStatus::InProgress;
                first.started_at = Some(now);
            }
        }
        self.reconcile_status(now);
        Ok(())
    }

    /// Mark the in-progress step completed and activate its successor, or
    /// complete the workflow when it was the last one.
    pub(crate) fn record_step_success(&mut self, step_id: Uuid, result: Value) -> Result<()> {
        self.ensure_not_terminal()?;
        let idx = self.step_index(step_id)?;
        let now = Utc::now();

        let step = &mut self.steps[idx];
        step.status = StepStatus::Completed;
        step.result = Some(result);
        step.error = None;
        step.completed_at = Some(now);

        self.activate_after(idx, now);
        self.updated_at = now;
        self.reconcile_status(now);
        Ok(())
    }

    /// Mark the step failed; the workflow fails with it.
    pub(crate) fn record_step_failure(&mut self, step_id: Uuid, error: impl Into<String>) -> Result<()> {
        self.ensure_not_terminal()?;
        let idx = self.step_index(step_id)?;
        let now = Utc::now();

        let step = &mut self.steps[idx];
        step.status = StepStatus::Failed;
        step.error = Some(error.into());
        step.completed_at = Some(now);

        self.updated_at = now;
        self.reconcile_status(now);
        Ok(())
    }

    /// Apply a caller-supplied step update.
    pub(crate) fn apply_step_update(
        &mut self,
        step_id: Uuid,
        update: StepUpdate,
    ) -> Result<UpdateEffect> {
        self.ensure_not_terminal()?;
        let idx = self.step_index(step_id)?;

        let was_in_progress = self.steps[idx].status == StepStatus::InProgress;
        let activated = match update.status {
            Some(StepStatus::InProgress) if !was_in_progress => {
                self.check_activation(idx)?;
                true
            }
            Some(StepStatus::Pending) if self.steps[idx].status != StepStatus::Pending => {
                return Err(HubError::InvalidState(format!(
                    "Step {} is {} and cannot return to pending",
                    step_id, self.steps[idx].status
                )));
            }
            _ => false,
        };

        let now = Utc::now();
        let step = &mut self.steps[idx];

        if let Some(name) = update.name {
            step.name = name;
        }
        if let Some(description) = update.description {
            step.description = description;
        }
        if let Some(parameters) = update.parameters {
            step.parameters = parameters;
        }
        if let Some(result) = update.result {
            step.result = Some(result);
        }
        if let Some(error) = update.error {
            step.error = Some(error);
        }
        if let Some(flag) = update.requires_user_action {
            step.requires_user_action = flag;
        }
        if update.started_at.is_some() {
            step.started_at = update.started_at;
        }
        if update.completed_at.is_some() {
            step.completed_at = update.completed_at;
        }

        if let Some(status) = update.status {
            step.status = status;
            match status {
                StepStatus::InProgress => {
                    step.started_at.get_or_insert(now);
                }
                StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped => {
                    step.completed_at.get_or_insert(now);
                }
                StepStatus::Pending => {}
            }
        }

        let advanced = self.status == WorkflowStatus::Active
            && was_in_progress
            && self.steps[idx].status.is_done()
            && self.activate_after(idx, now);

        self.updated_at = now;
        let became_terminal = self.reconcile_status(now);

        Ok(UpdateEffect {
            resume: (advanced || activated) && self.status == WorkflowStatus::Active,
            became_terminal,
        })
    }

    /// Only the first unfinished step of an active workflow may be put
    /// `in_progress`, and only while no other step is.
    fn check_activation(&self, idx: usize) -> Result<()> {
        if self.status != WorkflowStatus::Active {
            return Err(HubError::InvalidState(format!(
                "Workflow {} is {}; steps run only once it is started",
                self.id, self.status
            )));
        }
        if self.current_step().is_some() {
            return Err(HubError::InvalidState(format!(
                "Workflow {} already has a step in progress",
                self.id
            )));
        }
        let next = self.steps.iter().position(|s| !s.status.is_done());
        if next != Some(idx) || self.steps[idx].status != StepStatus::Pending {
            return Err(HubError::InvalidState(format!(
                "Step {} is not the next step of workflow {}",
                self.steps[idx].id, self.id
            )));
        }
        Ok(())
    }

    /// Flip the first pending step after `idx` to `in_progress`.
    fn activate_after(&mut self, idx: usize, now: DateTime<Utc>) -> bool {
        match self.steps[idx + 1..]
            .iter_mut()
            .find(|s| s.status == StepStatus::Pending)
        {
            Some(next) => {
                next.status = StepStatus::InProgress;
                next.started_at = Some(now);
                true
            }
            None => false,
        }
    }

    /// A failed step fails the workflow; all steps done completes it.
    /// Returns true when this call made the workflow terminal.
    fn reconcile_status(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        let next = if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            WorkflowStatus::Failed
        } else if self.all_steps_done() {
            WorkflowStatus::Completed
        } else {
            return false;
        };

        self.status = next;
        self.completed_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn specs(n: usize) -> Vec<StepSpec> {
        (0..n)
            .map(|i| StepSpec::new(format!("step {}", i), ServiceKind::Internal, "record_milestone"))
            .collect()
    }

    fn workflow(n: usize) -> Workflow {
        Workflow::new("test", "", specs(n), OwnerProfile::new("u1"), HashMap::new()).unwrap()
    }

    #[test]
    fn test_new_workflow_is_pending() {
        let wf = workflow(3);
        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert!(wf.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert!(wf.current_step().is_none());
    }

    #[test]
    fn test_empty_workflow_rejected() {
        let err = Workflow::new("x", "", vec![], OwnerProfile::default(), HashMap::new()).unwrap_err();
        assert!(matches!(err, HubError::InvalidInput(_)));
    }

    #[test]
    fn test_start_activates_first_step() {
        let mut wf = workflow(2);
        wf.start().unwrap();

        assert_eq!(wf.status, WorkflowStatus::Active);
        assert_eq!(wf.steps[0].status, StepStatus::InProgress);
        assert!(wf.steps[0].started_at.is_some());
        assert_eq!(wf.steps[1].status, StepStatus::Pending);

        assert!(matches!(wf.start(), Err(HubError::InvalidState(_))));
    }

    #[test]
    fn test_success_advances_and_completes() {
        let mut wf = workflow(2);
        wf.start().unwrap();

        let first = wf.steps[0].id;
        wf.record_step_success(first, json!({"ok": 1})).unwrap();
        assert_eq!(wf.steps[1].status, StepStatus::InProgress);
        assert_eq!(wf.status, WorkflowStatus::Active);

        let second = wf.steps[1].id;
        wf.record_step_success(second, json!({"ok": 2})).unwrap();
        assert_eq!(wf.status, WorkflowStatus::Completed);
        assert!(wf.completed_at.is_some());
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut wf = workflow(3);
        wf.start().unwrap();
        let first = wf.steps[0].id;

        wf.record_step_failure(first, "boom").unwrap();
        assert_eq!(wf.status, WorkflowStatus::Failed);
        assert_eq!(wf.steps[1].status, StepStatus::Pending);

        let err = wf
            .apply_step_update(wf.steps[1].id, StepUpdate::status(StepStatus::Completed))
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidState(_)));
    }

    #[test]
    fn test_update_rejects_second_in_progress() {
        let mut wf = workflow(3);
        wf.start().unwrap();

        let err = wf
            .apply_step_update(wf.steps[2].id, StepUpdate::status(StepStatus::InProgress))
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidState(_)));
        assert_eq!(wf.in_progress_count(), 1);
    }

    #[test]
    fn test_pending_workflow_rejects_in_progress_step() {
        let mut wf = workflow(3);
        let err = wf
            .apply_step_update(wf.steps[2].id, StepUpdate::status(StepStatus::InProgress))
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidState(_)));
        assert!(wf.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_current_step_cannot_return_to_pending() {
        let mut wf = workflow(2);
        wf.start().unwrap();

        let err = wf
            .apply_step_update(wf.steps[0].id, StepUpdate::status(StepStatus::Pending))
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidState(_)));
        assert_eq!(wf.steps[0].status, StepStatus::InProgress);
    }

    #[test]
    fn test_completing_current_step_requests_resume() {
        let mut wf = workflow(2);
        wf.start().unwrap();

        let effect = wf
            .apply_step_update(wf.steps[0].id, StepUpdate::completed(json!({"by": "human"})))
            .unwrap();
        assert!(effect.resume);
        assert!(!effect.became_terminal);
        assert!(wf.steps[0].completed_at.is_some());
        assert_eq!(wf.steps[1].status, StepStatus::InProgress);
    }

    #[test]
    fn test_skipping_everything_completes_pending_workflow() {
        let mut wf = workflow(2);
        for id in [wf.steps[0].id, wf.steps[1].id] {
            wf.apply_step_update(id, StepUpdate::status(StepStatus::Skipped)).unwrap();
        }
        assert_eq!(wf.status, WorkflowStatus::Completed);
    }

    #[test]
    fn test_update_unknown_step() {
        let mut wf = workflow(1);
        let err = wf
            .apply_step_update(Uuid::new_v4(), StepUpdate::default())
            .unwrap_err();
        assert!(matches!(err, HubError::NotFound(_)));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&StepStatus::InProgress).unwrap(), "\"in_progress\"");
        assert_eq!("active".parse::<WorkflowStatus>().unwrap(), WorkflowStatus::Active);
        assert!("bogus".parse::<ServiceKind>().is_err());
    }
}
