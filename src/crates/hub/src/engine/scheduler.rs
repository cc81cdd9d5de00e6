//! Execution scheduler.
//!
//! A bounded work queue of execution jobs, drained by one scheduler task that
//! spawns a task per job. Distinct workflows run interleaved; a single
//! workflow's steps are driven by one loop at a time.

use super::execution::EngineInner;
use super::{ExecutionOutcome, ExecutionReport};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error};
use uuid::Uuid;

pub(crate) struct ExecutionJob {
    pub workflow_id: Uuid,
    pub inner: Arc<EngineInner>,
    pub reply: Option<oneshot::Sender<ExecutionOutcome>>,
}

/// Start the scheduler task and return the queue feeding it.
pub(crate) fn spawn(
    capacity: usize,
    reports: broadcast::Sender<ExecutionReport>,
) -> mpsc::Sender<ExecutionJob> {
    let (tx, mut rx) = mpsc::channel::<ExecutionJob>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let reports = reports.clone();

            tokio::spawn(async move {
                let ExecutionJob {
                    workflow_id,
                    inner,
                    reply,
                } = job;

                let outcome = inner.run(workflow_id).await;
                if let ExecutionOutcome::Aborted { reason } = &outcome {
                    error!(workflow_id = %workflow_id, reason = %reason, "Workflow execution aborted");
                }

                // No subscribers is fine.
                let _ = reports.send(ExecutionReport {
                    workflow_id,
                    outcome: outcome.clone(),
                });
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            });
        }

        debug!("Execution scheduler stopped");
    });

    tx
}
