use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::queue::{EmailJob, JobQueue, JobStatus};

/// Waiting job ids, oldest at the head
const WAITING_LIST: &str = "volunteer:mail:queue";
/// Each job is stored as JSON under this prefix followed by its id
const JOB_KEY_PREFIX: &str = "volunteer:mail:";

/// Delivered and dead jobs expire after a week
const FINISHED_JOB_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

fn job_key(job_id: Uuid) -> String {
    format!("{JOB_KEY_PREFIX}{job_id}")
}

fn encode(job: &EmailJob) -> AppResult<String> {
    serde_json::to_string(job)
        .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))
}

fn decode(json: &str) -> AppResult<EmailJob> {
    serde_json::from_str(json)
        .map_err(|e| AppError::Internal(format!("Deserialization error: {}", e)))
}

/// Email queue shared between the API process and the worker through Redis
#[derive(Clone)]
pub struct RedisQueue {
    conn: ConnectionManager,
}

impl RedisQueue {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Write the job record; finished jobs get an expiry
    async fn store(&self, job: &EmailJob) -> AppResult<()> {
        let json = encode(job)?;
        let mut conn = self.conn.clone();
        let _: () = if job.status.is_terminal() {
            conn.set_ex(job_key(job.id), json, FINISHED_JOB_TTL_SECONDS).await?
        } else {
            conn.set(job_key(job.id), json).await?
        };
        Ok(())
    }

    /// Write the job record and append its id to the waiting list in one step
    async fn store_and_push(&self, job: &EmailJob) -> AppResult<()> {
        let json = encode(job)?;
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .set(job_key(job.id), json)
            .ignore()
            .rpush(WAITING_LIST, job.id.to_string())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Load, change and write back a job that must exist
    async fn modify<T>(
        &self,
        job_id: Uuid,
        change: impl FnOnce(&mut EmailJob) -> T,
    ) -> AppResult<(EmailJob, T)> {
        let mut job = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job".to_string()))?;
        let out = change(&mut job);
        self.store(&job).await?;
        Ok((job, out))
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn enqueue(&self, job: EmailJob) -> AppResult<Uuid> {
        self.store_and_push(&job).await?;
        tracing::debug!(job_id = %job.id, to = %job.to, "Email job enqueued");
        Ok(job.id)
    }

    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<EmailJob>> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> =
            conn.blpop(WAITING_LIST, timeout_seconds as f64).await?;
        let Some((_, raw_id)) = popped else {
            return Ok(None);
        };

        let job_id = Uuid::parse_str(&raw_id)
            .map_err(|e| AppError::Internal(format!("Invalid job id {raw_id}: {e}")))?;

        match self.modify(job_id, EmailJob::start).await {
            Ok((job, ())) => {
                tracing::debug!(job_id = %job_id, "Email job dequeued");
                Ok(Some(job))
            }
            Err(AppError::NotFound(_)) => {
                tracing::warn!(job_id = %job_id, "Queued email job has no record, skipping");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_job(&self, job_id: Uuid) -> AppResult<Option<EmailJob>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(job_key(job_id)).await?;
        json.as_deref().map(decode).transpose()
    }

    async fn complete_job(&self, job_id: Uuid) -> AppResult<()> {
        let (job, ()) = self.modify(job_id, EmailJob::complete).await?;
        tracing::info!(job_id = %job_id, to = %job.to, "Email job completed");
        Ok(())
    }

    async fn fail_job(
        &self,
        job_id: Uuid,
        error: String,
        retryable: bool,
    ) -> AppResult<JobStatus> {
        let (job, status) = self
            .modify(job_id, |job| job.fail(error, retryable))
            .await?;

        tracing::warn!(
            job_id = %job_id,
            status = status.as_str(),
            retry_count = job.retry_count,
            error = job.error_message.as_deref().unwrap_or_default(),
            "Email job failed"
        );

        Ok(status)
    }

    async fn queue_length(&self) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        Ok(conn.llen(WAITING_LIST).await?)
    }

    async fn requeue(&self, job_id: Uuid) -> AppResult<()> {
        let mut job = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job".to_string()))?;
        job.reset_for_retry()?;
        self.store_and_push(&job).await?;

        tracing::info!(job_id = %job_id, retry_count = job.retry_count, "Email job requeued");
        Ok(())
    }
}
