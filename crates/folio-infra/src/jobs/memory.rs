//! Bounded in-process job queue.
//!
//! Jobs wait in a tokio channel and are drained by a fixed pool of worker
//! tasks. Nothing is persisted: queued jobs are lost on restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use folio_core::ports::{Job, JobHandler, JobQueue, JobQueueError, JobResult, QueueStats};

/// In-memory job queue configuration.
#[derive(Debug, Clone)]
pub struct InMemoryJobQueueConfig {
    /// Jobs that may wait at once before `enqueue` reports a full queue.
    pub capacity: usize,
    /// Number of worker tasks.
    pub workers: usize,
}

impl Default for InMemoryJobQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            workers: 4,
        }
    }
}

impl InMemoryJobQueueConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: usize| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(fallback)
        };

        Self {
            capacity: read("JOB_QUEUE_MAX_SIZE", defaults.capacity),
            workers: read("JOB_QUEUE_WORKERS", defaults.workers),
        }
    }
}

#[derive(Default)]
struct Counters {
    pending: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.load(Ordering::Relaxed),
            processing: self.processing.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Job queue backed by a bounded tokio channel.
pub struct InMemoryJobQueue {
    workers: usize,
    counters: Arc<Counters>,
    sender: mpsc::Sender<Job>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl InMemoryJobQueue {
    pub fn new(config: InMemoryJobQueueConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));

        Self {
            workers: config.workers.max(1),
            counters: Arc::new(Counters::default()),
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Spawn the worker pool. Each job runs through `handler` once; a failed
    /// job is logged and dropped.
    pub fn start_workers(&self, handler: JobHandler) {
        let handler = Arc::new(handler);

        for id in 0..self.workers {
            let worker = Worker {
                id,
                handler: handler.clone(),
                receiver: self.receiver.clone(),
                counters: self.counters.clone(),
            };
            tokio::spawn(worker.run());
        }
    }
}

struct Worker {
    id: usize,
    handler: Arc<JobHandler>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    counters: Arc<Counters>,
}

impl Worker {
    async fn run(self) {
        tracing::info!(worker = self.id, "Job worker started");

        // The lock is only held while waiting for the next job.
        while let Some(job) = self.next_job().await {
            self.counters.pending.fetch_sub(1, Ordering::Relaxed);
            self.counters.processing.fetch_add(1, Ordering::Relaxed);

            let job_id = job.id;
            let job_type = job.job_type.clone();
            tracing::debug!(worker = self.id, job_id = %job_id, job_type = %job_type, "Running job");

            let outcome = (self.handler)(job).await;
            self.counters.processing.fetch_sub(1, Ordering::Relaxed);

            match outcome {
                JobResult::Success => {
                    self.counters.completed.fetch_add(1, Ordering::Relaxed);
                }
                JobResult::Failed(reason) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(job_id = %job_id, job_type = %job_type, %reason, "Job failed");
                }
            }
        }

        tracing::info!(worker = self.id, "Job worker stopped");
    }

    async fn next_job(&self) -> Option<Job> {
        self.receiver.lock().await.recv().await
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError> {
        // Count first so a fast worker never sees the counter underflow.
        self.counters.pending.fetch_add(1, Ordering::Relaxed);

        match self.sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.counters.pending.fetch_sub(1, Ordering::Relaxed);
                Err(match e {
                    mpsc::error::TrySendError::Full(_) => JobQueueError::QueueFull,
                    mpsc::error::TrySendError::Closed(_) => {
                        JobQueueError::EnqueueError("queue closed".to_string())
                    }
                })
            }
        }
    }

    async fn stats(&self) -> Result<QueueStats, JobQueueError> {
        Ok(self.counters.snapshot())
    }
}
