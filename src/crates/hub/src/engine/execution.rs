//! The execution loop.
//!
//! Drives an `active` workflow one step at a time: dispatch the `in_progress`
//! step, record the result, activate the next step, repeat. A step failure
//! fails the workflow and stops the loop. Steps that need a person stop the
//! loop until `update_workflow_step` completes them.
//!
//! Every read-modify-save of a workflow happens under the engine's write lock.
//! The dispatch itself runs outside the lock; afterwards the loop re-reads the
//! workflow and gives up if someone else moved it on in the meantime.

use super::ExecutionOutcome;
use crate::dispatch::StepDispatcher;
use crate::events::EventBus;
use crate::model::{Step, StepStatus, Workflow, WorkflowStatus};
use crate::store::WorkflowRepository;
use crate::{HubError, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) const EVENT_SOURCE: &str = "workflow_engine";

pub(crate) struct EngineInner {
    pub repository: Arc<dyn WorkflowRepository>,
    pub dispatcher: Arc<StepDispatcher>,
    pub events: Option<EventBus>,
    pub write_lock: Mutex<()>,
}

/// What the loop does next, decided under the lock.
enum NextMove {
    Dispatch(Step),
    Stop(ExecutionOutcome),
}

impl EngineInner {
    pub async fn load(&self, id: Uuid) -> Result<Workflow> {
        self.repository
            .get(&id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("Workflow {}", id)))
    }

    /// Run the loop to its next stopping point.
    pub async fn run(&self, workflow_id: Uuid) -> ExecutionOutcome {
        match self.drive(workflow_id).await {
            Ok(outcome) => outcome,
            Err(e) => ExecutionOutcome::Aborted {
                reason: e.to_string(),
            },
        }
    }

    async fn drive(&self, workflow_id: Uuid) -> Result<ExecutionOutcome> {
        loop {
            let step = match self.next_move(workflow_id).await? {
                NextMove::Dispatch(step) => step,
                NextMove::Stop(outcome) => return Ok(outcome),
            };

            let dispatched = self.dispatcher.dispatch(&step).await;

            let _guard = self.write_lock.lock().await;
            let mut workflow = self.load(workflow_id).await?;

            let still_current = workflow.status == WorkflowStatus::Active
                && workflow
                    .step(step.id)
                    .map_or(false, |s| s.status == StepStatus::InProgress);
            if !still_current {
                info!(
                    workflow_id = %workflow_id,
                    step_id = %step.id,
                    "Workflow changed while the step was running; leaving it as is"
                );
                return Ok(ExecutionOutcome::Halted {
                    status: workflow.status,
                });
            }

            match dispatched {
                Ok(result) => {
                    workflow.record_step_success(step.id, result)?;
                    self.repository.save(&workflow).await?;
                    debug!(workflow_id = %workflow_id, step = %step.name, "Step completed");

                    if workflow.status == WorkflowStatus::Completed {
                        info!(workflow_id = %workflow_id, name = %workflow.name, "Workflow completed");
                        self.notify("workflow_completed", &workflow, json!({}));
                        return Ok(ExecutionOutcome::Completed);
                    }
                }
                Err(e) => {
                    let error = e.to_string();
                    workflow.record_step_failure(step.id, error.clone())?;
                    self.repository.save(&workflow).await?;

                    warn!(
                        workflow_id = %workflow_id,
                        step = %step.name,
                        error = %error,
                        "Step failed, halting workflow"
                    );
                    self.notify(
                        "workflow_failed",
                        &workflow,
                        json!({ "step_id": step.id, "error": error }),
                    );
                    return Ok(ExecutionOutcome::Failed {
                        step_id: step.id,
                        error,
                    });
                }
            }
        }
    }

    async fn next_move(&self, workflow_id: Uuid) -> Result<NextMove> {
        let _guard = self.write_lock.lock().await;
        let workflow = self.load(workflow_id).await?;

        if workflow.status != WorkflowStatus::Active {
            return Ok(NextMove::Stop(ExecutionOutcome::Halted {
                status: workflow.status,
            }));
        }

        let Some(step) = workflow.current_step() else {
            warn!(workflow_id = %workflow_id, "Active workflow has no step in progress");
            return Ok(NextMove::Stop(ExecutionOutcome::Halted {
                status: workflow.status,
            }));
        };

        if step.requires_user_action {
            info!(
                workflow_id = %workflow_id,
                step = %step.name,
                "Step needs user action, pausing workflow"
            );
            return Ok(NextMove::Stop(ExecutionOutcome::AwaitingUserAction {
                step_id: step.id,
            }));
        }

        Ok(NextMove::Dispatch(step.clone()))
    }

    /// Publish a lifecycle event when a bus is attached.
    pub fn notify(&self, event_type: &str, workflow: &Workflow, extra: serde_json::Value) {
        let Some(events) = &self.events else {
            return;
        };

        let mut data = json!({
            "workflow_id": workflow.id,
            "name": workflow.name,
            "status": workflow.status,
            "user_id": workflow.owner.user_id,
        });
        if let (Some(data), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
            data.extend(extra.clone());
        }

        events.publish(event_type, EVENT_SOURCE, data);
    }
}
