//! Background work: jobs handed off to a worker pool.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    /// Routing key, e.g. `post.views.persist`.
    pub job_type: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

/// How a job ended. There are no retries.
#[derive(Debug, PartialEq, Eq)]
pub enum JobResult {
    Success,
    Failed(String),
}

/// Worker-side entry point for every job taken off a queue.
pub type JobHandler =
    Box<dyn Fn(Job) -> Pin<Box<dyn Future<Output = JobResult> + Send>> + Send + Sync>;

/// Producer side of a background worker pool.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Hand a job over without waiting for it to run.
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError>;

    async fn stats(&self) -> Result<QueueStats, JobQueueError>;
}

/// Point-in-time counters of a queue.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("Failed to enqueue job: {0}")]
    EnqueueError(String),

    #[error("Queue is full")]
    QueueFull,
}
