pub mod job;
pub mod memory_queue;
pub mod redis_queue;

pub use job::{EmailBody, EmailJob, EmailTemplate, JobStatus};
pub use memory_queue::InMemoryQueue;
pub use redis_queue::RedisQueue;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;

/// Email job queue, abstracting the queue backend
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Push a job onto the queue
    async fn enqueue(&self, job: EmailJob) -> AppResult<Uuid>;

    /// Pop the next job from the queue (blocking with timeout)
    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<EmailJob>>;

    /// Get job by ID
    async fn get_job(&self, job_id: Uuid) -> AppResult<Option<EmailJob>>;

    /// Mark job as delivered
    async fn complete_job(&self, job_id: Uuid) -> AppResult<()>;

    /// Mark job as failed with error message; returns the resulting status
    async fn fail_job(&self, job_id: Uuid, error: String, retryable: bool)
        -> AppResult<JobStatus>;

    /// Get queue length
    async fn queue_length(&self) -> AppResult<u64>;

    /// Requeue failed job for retry
    async fn requeue(&self, job_id: Uuid) -> AppResult<()>;
}
