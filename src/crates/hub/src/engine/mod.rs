//! Workflow engine: lifecycle, sequencing and the execution loop.
//!
//! `start_workflow` returns as soon as the workflow is `active`; the execution
//! loop runs on the scheduler. Callers that need the outcome use
//! [`WorkflowEngine::start_workflow_tracked`] or [`WorkflowEngine::subscribe`]
//! instead of polling.

mod execution;
mod scheduler;

use crate::dispatch::StepDispatcher;
use crate::events::EventBus;
use crate::model::{OwnerProfile, StepSpec, StepUpdate, Workflow, WorkflowStatus};
use crate::store::WorkflowRepository;
use crate::{HubError, Result};
use execution::EngineInner;
use scheduler::ExecutionJob;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::info;
use uuid::Uuid;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the execution work queue
    pub queue_capacity: usize,
    /// Capacity of the outcome broadcast channel
    pub report_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            report_capacity: 128,
        }
    }
}

/// Where an execution run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Every step completed
    Completed,
    /// A step failed; the workflow is `failed`
    Failed { step_id: Uuid, error: String },
    /// Paused on a step that a person has to complete
    AwaitingUserAction { step_id: Uuid },
    /// The workflow was not (or no longer) `active`
    Halted { status: WorkflowStatus },
    /// The run could not read or write the workflow
    Aborted { reason: String },
}

/// One finished execution run, as broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub workflow_id: Uuid,
    pub outcome: ExecutionOutcome,
}

/// Resolves when the execution run started with the workflow stops.
#[derive(Debug)]
pub struct ExecutionHandle {
    workflow_id: Uuid,
    rx: oneshot::Receiver<ExecutionOutcome>,
}

impl ExecutionHandle {
    pub fn workflow_id(&self) -> Uuid {
        self.workflow_id
    }

    pub async fn wait(self) -> Result<ExecutionOutcome> {
        self.rx.await.map_err(|_| {
            HubError::Scheduler(format!(
                "Execution of workflow {} was dropped",
                self.workflow_id
            ))
        })
    }
}

/// Owns workflow lifecycle and drives execution
#[derive(Clone)]
pub struct WorkflowEngine {
    inner: Arc<EngineInner>,
    jobs: mpsc::Sender<ExecutionJob>,
    reports: broadcast::Sender<ExecutionReport>,
}

impl WorkflowEngine {
    /// Create an engine and start its scheduler. Must be called inside a
    /// tokio runtime.
    pub fn new(
        repository: Arc<dyn WorkflowRepository>,
        dispatcher: Arc<StepDispatcher>,
        config: EngineConfig,
    ) -> Self {
        let (reports, _) = broadcast::channel(config.report_capacity.max(1));
        let jobs = scheduler::spawn(config.queue_capacity, reports.clone());

        Self {
            inner: Arc::new(EngineInner {
                repository,
                dispatcher,
                events: None,
                write_lock: Mutex::new(()),
            }),
            jobs,
            reports,
        }
    }

    /// Publish lifecycle events to `bus`. Call before the engine is cloned.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.inner = Arc::new(EngineInner {
            repository: self.inner.repository.clone(),
            dispatcher: self.inner.dispatcher.clone(),
            events: Some(bus),
            write_lock: Mutex::new(()),
        });
        self
    }

    /// Build and store a `pending` workflow. Nothing runs until it is started.
    pub async fn create_workflow(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<StepSpec>,
        owner: OwnerProfile,
        metadata: HashMap<String, Value>,
    ) -> Result<Workflow> {
        if let Some(spec) = steps
            .iter()
            .find(|s| !self.inner.dispatcher.supports(s.service))
        {
            return Err(HubError::InvalidInput(format!(
                "Step '{}' names unknown service {}",
                spec.name, spec.service
            )));
        }

        let workflow = Workflow::new(name, description, steps, owner, metadata)?;
        self.inner.repository.save(&workflow).await?;

        info!(
            workflow_id = %workflow.id,
            name = %workflow.name,
            steps = workflow.steps.len(),
            "Workflow created"
        );
        Ok(workflow)
    }

    pub async fn get_workflow(&self, id: Uuid) -> Result<Workflow> {
        self.inner.load(id).await
    }

    /// Pending and active workflows
    pub async fn list_active(&self) -> Result<Vec<Workflow>> {
        self.inner.repository.list_active().await
    }

    /// Apply a field-level update to one step.
    ///
    /// Completing or skipping the in-progress step of an active workflow
    /// activates the next step and resumes the execution loop.
    pub async fn update_workflow_step(
        &self,
        workflow_id: Uuid,
        step_id: Uuid,
        update: StepUpdate,
    ) -> Result<Workflow> {
        let (workflow, effect) = {
            let _guard = self.inner.write_lock.lock().await;
            let mut workflow = self.inner.load(workflow_id).await?;
            let effect = workflow.apply_step_update(step_id, update)?;
            self.inner.repository.save(&workflow).await?;
            (workflow, effect)
        };

        info!(
            workflow_id = %workflow_id,
            step_id = %step_id,
            status = %workflow.status,
            "Workflow step updated"
        );

        if effect.became_terminal {
            let event_type = match workflow.status {
                WorkflowStatus::Failed => "workflow_failed",
                _ => "workflow_completed",
            };
            self.inner
                .notify(event_type, &workflow, json!({ "step_id": step_id }));
        }
        if effect.resume {
            self.enqueue(workflow_id, None).await?;
        }

        Ok(workflow)
    }

    /// `pending -> active` and schedule the execution loop. Returns the
    /// snapshot taken right after the transition.
    pub async fn start_workflow(&self, id: Uuid) -> Result<Workflow> {
        let workflow = self.activate(id).await?;
        self.enqueue(id, None).await?;
        Ok(workflow)
    }

    /// Like [`start_workflow`](Self::start_workflow), plus a handle on the
    /// outcome of the run.
    pub async fn start_workflow_tracked(&self, id: Uuid) -> Result<(Workflow, ExecutionHandle)> {
        let workflow = self.activate(id).await?;
        let (tx, rx) = oneshot::channel();
        self.enqueue(id, Some(tx)).await?;
        Ok((workflow, ExecutionHandle { workflow_id: id, rx }))
    }

    /// Receive a report for every finished execution run.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionReport> {
        self.reports.subscribe()
    }

    /// Re-schedule every `active` workflow in the repository.
    pub async fn resume_active(&self) -> Result<usize> {
        let active: Vec<Uuid> = self
            .inner
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter(|w| w.status == WorkflowStatus::Active)
            .map(|w| w.id)
            .collect();

        for id in &active {
            self.enqueue(*id, None).await?;
        }

        if !active.is_empty() {
            info!(count = active.len(), "Resumed active workflows");
        }
        Ok(active.len())
    }

    async fn activate(&self, id: Uuid) -> Result<Workflow> {
        let workflow = {
            let _guard = self.inner.write_lock.lock().await;
            let mut workflow = self.inner.load(id).await?;
            workflow.start()?;
            self.inner.repository.save(&workflow).await?;
            workflow
        };

        info!(workflow_id = %id, name = %workflow.name, "Workflow started");
        self.inner.notify("workflow_started", &workflow, json!({}));
        Ok(workflow)
    }

    async fn enqueue(
        &self,
        workflow_id: Uuid,
        reply: Option<oneshot::Sender<ExecutionOutcome>>,
    ) -> Result<()> {
        self.jobs
            .send(ExecutionJob {
                workflow_id,
                inner: self.inner.clone(),
                reply,
            })
            .await
            .map_err(|_| HubError::Scheduler("Execution scheduler has stopped".to_string()))
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("dispatcher", &self.inner.dispatcher)
            .field("events", &self.inner.events.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ServiceKind, StepStatus};
    use crate::store::InMemoryRepository;
    use crate::dispatch::InternalSteps;

    fn engine() -> WorkflowEngine {
        let dispatcher = StepDispatcher::new().register(Arc::new(InternalSteps));
        WorkflowEngine::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(dispatcher),
            EngineConfig::default(),
        )
    }

    fn milestone(name: &str) -> StepSpec {
        StepSpec::new(name, ServiceKind::Internal, "record_milestone")
            .with_parameters(json!({ "milestone": name }))
    }

    #[tokio::test]
    async fn test_create_rejects_unregistered_service() {
        let err = engine()
            .create_workflow(
                "bad",
                "",
                vec![StepSpec::new("upload", ServiceKind::Video, "upload_video")],
                OwnerProfile::new("u1"),
                HashMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_tracked_run_completes() {
        let engine = engine();
        let wf = engine
            .create_workflow(
                "milestones",
                "",
                vec![milestone("a"), milestone("b")],
                OwnerProfile::new("u1"),
                HashMap::new(),
            )
            .await
            .unwrap();

        let (snapshot, handle) = engine.start_workflow_tracked(wf.id).await.unwrap();
        assert_eq!(snapshot.status, WorkflowStatus::Active);
        assert_eq!(handle.workflow_id(), wf.id);

        assert_eq!(handle.wait().await.unwrap(), ExecutionOutcome::Completed);

        let done = engine.get_workflow(wf.id).await.unwrap();
        assert_eq!(done.status, WorkflowStatus::Completed);
        assert!(done.steps.iter().all(|s| s.status == StepStatus::Completed));
    }

    #[tokio::test]
    async fn test_start_twice_is_invalid_state() {
        let engine = engine();
        let wf = engine
            .create_workflow("once", "", vec![milestone("a")], OwnerProfile::new("u1"), HashMap::new())
            .await
            .unwrap();

        engine.start_workflow(wf.id).await.unwrap();
        let err = engine.start_workflow(wf.id).await.unwrap_err();
        assert!(matches!(err, HubError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_unknown_workflow() {
        let err = engine().get_workflow(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, HubError::NotFound(_)));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let value = serde_json::to_value(ExecutionOutcome::Halted {
            status: WorkflowStatus::Failed,
        })
        .unwrap();
        assert_eq!(value, json!({ "outcome": "halted", "status": "failed" }));
    }
}
