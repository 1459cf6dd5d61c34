use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use volunteer_match::error::{AppError, AppResult};
use volunteer_match::queue::{EmailJob, InMemoryQueue, JobQueue, JobStatus};

/// In-memory queue whose first `failures` enqueues are refused
#[derive(Clone)]
pub struct FlakyQueue {
    inner: InMemoryQueue,
    failures: usize,
    attempts: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FlakyQueue {
    pub fn new(inner: InMemoryQueue, failures: usize) -> Self {
        Self {
            inner,
            failures,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every enqueue is refused
    pub fn down(inner: InMemoryQueue) -> Self {
        Self::new(inner, usize::MAX)
    }

    /// Enqueue calls seen so far, refused or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobQueue for FlakyQueue {
    async fn enqueue(&self, job: EmailJob) -> AppResult<Uuid> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(AppError::Queue("connection refused".to_string()));
        }
        self.inner.enqueue(job).await
    }

    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<EmailJob>> {
        self.inner.dequeue(timeout_seconds).await
    }

    async fn get_job(&self, job_id: Uuid) -> AppResult<Option<EmailJob>> {
        self.inner.get_job(job_id).await
    }

    async fn complete_job(&self, job_id: Uuid) -> AppResult<()> {
        self.inner.complete_job(job_id).await
    }

    async fn fail_job(
        &self,
        job_id: Uuid,
        error: String,
        retryable: bool,
    ) -> AppResult<JobStatus> {
        self.inner.fail_job(job_id, error, retryable).await
    }

    async fn queue_length(&self) -> AppResult<u64> {
        self.inner.queue_length().await
    }

    async fn requeue(&self, job_id: Uuid) -> AppResult<()> {
        self.inner.requeue(job_id).await
    }
}
