//! Background execution of queued operations
//!
//! [`ResourceController::perform_async`](crate::handlers::ResourceController::perform_async)
//! does not run an operation. It serializes the operation name and the
//! request parameters into an [`OperationJob`] and hands it to a
//! [`JobQueue`]. The response is sent without waiting for the job.
//!
//! [`LocalJobQueue`] is the in-process queue: a bounded channel drained by
//! one worker task that runs each job against an [`OperationRegistry`].
//! Job state is tracked in a shared `DashMap` and can be inspected while
//! the service runs.
//!
//! # Architecture
//!
//! ```text
//! perform_async ──enqueue──▶ mpsc channel ──▶ worker task ──▶ OperationRegistry::call
//!                               │                               │
//!                               └── statuses: DashMap<Uuid, JobStatus> ◀──┘
//! ```
//!
//! There are no retries, timeouts or ordering guarantees beyond the
//! channel's FIFO.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::JobsConfig;
use crate::handlers::params::{ActionParams, OperationInput};
use crate::operations::OperationRegistry;
use crate::outcome::Outcome;

/// A queued operation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationJob {
    /// Job identifier
    pub id: Uuid,
    /// Registry name of the operation
    pub operation: String,
    /// Parameters the operation will receive
    pub params: ActionParams,
    /// When the job was created
    pub enqueued_at: DateTime<Utc>,
}

impl OperationJob {
    /// Create a job for an operation with its parameters
    pub fn new(operation: impl Into<String>, params: ActionParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation: operation.into(),
            params,
            enqueued_at: Utc::now(),
        }
    }
}

/// Lifecycle state of a job
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued but not yet picked up
    #[default]
    Pending,
    /// Currently running
    Running,
    /// The operation returned success
    Completed,
    /// The operation failed or could not be run
    Failed(String),
}

/// Errors raised when handing a job to a queue
#[derive(Debug, Error)]
pub enum JobError {
    /// The queue is at capacity
    #[error("job queue is full")]
    Full,
    /// The queue no longer accepts jobs
    #[error("job queue is closed")]
    Closed,
    /// Transport-specific failure
    #[error("job transport error: {0}")]
    Transport(String),
}

/// Destination for queued operation runs
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Hand a job to the queue, returning its identifier
    async fn enqueue(&self, job: OperationJob) -> Result<Uuid, JobError>;
}

/// In-process job queue with a single worker
pub struct LocalJobQueue {
    sender: mpsc::Sender<OperationJob>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
    jobs: Arc<DashMap<Uuid, OperationJob>>,
    cancel_token: CancellationToken,
    worker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl LocalJobQueue {
    /// Start the worker and return the queue
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(operations: Arc<OperationRegistry>, config: &JobsConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let statuses = Arc::new(DashMap::new());
        let jobs = Arc::new(DashMap::new());
        let cancel_token = CancellationToken::new();

        let worker = tokio::spawn(run_worker(
            receiver,
            operations,
            Arc::clone(&statuses),
            cancel_token.clone(),
        ));
        tracing::info!(capacity = config.capacity, "local job queue started");

        Self {
            sender,
            statuses,
            jobs,
            cancel_token,
            worker: std::sync::Mutex::new(Some(worker)),
        }
    }

    /// Status of a job, if it was enqueued here
    pub fn status(&self, id: &Uuid) -> Option<JobStatus> {
        self.statuses.get(id).map(|entry| entry.value().clone())
    }

    /// Every job enqueued here, oldest first
    pub fn jobs(&self) -> Vec<OperationJob> {
        let mut jobs: Vec<_> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by_key(|job| job.enqueued_at);
        jobs
    }

    /// Drop completed and failed jobs from tracking
    ///
    /// Returns how many jobs were removed. Pending and running jobs stay.
    pub fn cleanup_finished(&self) -> usize {
        let finished: Vec<Uuid> = self
            .statuses
            .iter()
            .filter(|entry| matches!(entry.value(), JobStatus::Completed | JobStatus::Failed(_)))
            .map(|entry| *entry.key())
            .collect();

        for id in &finished {
            self.statuses.remove(id);
            self.jobs.remove(id);
        }
        if !finished.is_empty() {
            tracing::debug!(removed = finished.len(), "finished jobs cleaned up");
        }
        finished.len()
    }

    /// Stop the worker
    ///
    /// Jobs still in the channel are dropped and stay `Pending`.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "job worker ended abnormally");
            }
        }
        tracing::info!("local job queue stopped");
    }
}

impl Drop for LocalJobQueue {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn enqueue(&self, job: OperationJob) -> Result<Uuid, JobError> {
        if self.cancel_token.is_cancelled() {
            return Err(JobError::Closed);
        }
        let id = job.id;
        self.statuses.insert(id, JobStatus::Pending);
        self.jobs.insert(id, job.clone());

        if let Err(e) = self.sender.try_send(job) {
            self.statuses.remove(&id);
            self.jobs.remove(&id);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => JobError::Full,
                mpsc::error::TrySendError::Closed(_) => JobError::Closed,
            });
        }
        tracing::debug!(job_id = %id, "job enqueued");
        Ok(id)
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<OperationJob>,
    operations: Arc<OperationRegistry>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
    cancel_token: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            _ = cancel_token.cancelled() => break,
            job = receiver.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        statuses.insert(job.id, JobStatus::Running);
        tracing::info!(job_id = %job.id, operation = %job.operation, "running queued operation");

        let status = match operations
            .call(&job.operation, OperationInput::Params(job.params))
            .await
        {
            Ok(Outcome::Success(payload)) => {
                tracing::info!(job_id = %job.id, payload = payload.kind(), "queued operation completed");
                JobStatus::Completed
            }
            Ok(Outcome::Failure(fault)) => {
                tracing::warn!(job_id = %job.id, fault = fault.kind(), "queued operation failed");
                JobStatus::Failed(format!("operation returned {} failure", fault.kind()))
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "queued operation could not run");
                JobStatus::Failed(e.message)
            }
        };
        statuses.insert(job.id, status);
    }
    tracing::debug!("job worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::params::InputShape;
    use crate::operations::{Fault, FnOperation, Payload};
    use serde_json::json;
    use std::time::Duration;

    fn registry() -> Arc<OperationRegistry> {
        let registry = OperationRegistry::new()
            .try_with(FnOperation::new(
                "reindex",
                InputShape::Params,
                |_input: OperationInput| async { Outcome::Success(Payload::message("ok")) },
            ))
            .unwrap()
            .try_with(FnOperation::new(
                "explode",
                InputShape::Params,
                |_input: OperationInput| async { Outcome::Failure(Fault::message("no")) },
            ))
            .unwrap();
        Arc::new(registry)
    }

    async fn wait_for(queue: &LocalJobQueue, id: Uuid) -> JobStatus {
        for _ in 0..100 {
            match queue.status(&id) {
                Some(JobStatus::Pending) | Some(JobStatus::Running) | None => {
                    tokio::time::sleep(Duration::from_millis(10)).await
                }
                Some(done) => return done,
            }
        }
        queue.status(&id).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_job_runs_to_completion() {
        let queue = LocalJobQueue::start(registry(), &JobsConfig::default());
        let mut params = ActionParams::default();
        params.insert("scope".into(), json!("all"));

        let id = queue
            .enqueue(OperationJob::new("reindex", params.clone()))
            .await
            .unwrap();
        assert_eq!(wait_for(&queue, id).await, JobStatus::Completed);

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].operation, "reindex");
        assert_eq!(jobs[0].params, params);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_failures_are_recorded() {
        let queue = LocalJobQueue::start(registry(), &JobsConfig::default());

        let failed = queue
            .enqueue(OperationJob::new("explode", ActionParams::default()))
            .await
            .unwrap();
        let unknown = queue
            .enqueue(OperationJob::new("missing", ActionParams::default()))
            .await
            .unwrap();

        assert_eq!(
            wait_for(&queue, failed).await,
            JobStatus::Failed("operation returned message failure".to_string())
        );
        assert_eq!(
            wait_for(&queue, unknown).await,
            JobStatus::Failed("Operation missing is not registered".to_string())
        );
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_cleanup_finished_drops_completed_and_failed() {
        let queue = LocalJobQueue::start(registry(), &JobsConfig::default());

        let mut ids = Vec::new();
        for _ in 0..50 {
            ids.push(
                queue
                    .enqueue(OperationJob::new("reindex", ActionParams::default()))
                    .await
                    .unwrap(),
            );
        }
        let failed = queue
            .enqueue(OperationJob::new("explode", ActionParams::default()))
            .await
            .unwrap();
        for id in &ids {
            assert_eq!(wait_for(&queue, *id).await, JobStatus::Completed);
        }
        assert!(matches!(wait_for(&queue, failed).await, JobStatus::Failed(_)));
        assert_eq!(queue.jobs().len(), 51);

        assert_eq!(queue.cleanup_finished(), 51);
        assert!(queue.jobs().is_empty());
        assert!(queue.status(&failed).is_none());
        assert_eq!(queue.cleanup_finished(), 0);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_cleanup_keeps_pending_jobs() {
        let queue = LocalJobQueue::start(registry(), &JobsConfig::default());
        queue.shutdown().await;

        // A job recorded but never picked up stays tracked.
        let job = OperationJob::new("reindex", ActionParams::default());
        queue.statuses.insert(job.id, JobStatus::Pending);
        queue.jobs.insert(job.id, job.clone());

        assert_eq!(queue.cleanup_finished(), 0);
        assert_eq!(queue.status(&job.id), Some(JobStatus::Pending));
        assert_eq!(queue.jobs().len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_rejected() {
        let queue = LocalJobQueue::start(registry(), &JobsConfig::default());
        queue.shutdown().await;

        let err = queue
            .enqueue(OperationJob::new("reindex", ActionParams::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Closed));
    }

    #[test]
    fn test_job_serializes() {
        let job = OperationJob::new("reindex", ActionParams::default());
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["operation"], json!("reindex"));
        assert_eq!(value["params"], json!({}));

        let status = serde_json::to_value(JobStatus::Failed("boom".into())).unwrap();
        assert_eq!(status, json!({"state": "failed", "reason": "boom"}));
    }
}
