use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::queue::{EmailJob, JobQueue, JobStatus};

/// Process-local email queue, used by the test suite and for runs without Redis
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    state: Arc<Mutex<QueueState>>,
    wakeup: Arc<Notify>,
}

#[derive(Default)]
struct QueueState {
    waiting: VecDeque<Uuid>,
    jobs: HashMap<Uuid, EmailJob>,
}

impl QueueState {
    fn job_mut(&mut self, job_id: Uuid) -> AppResult<&mut EmailJob> {
        self.jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound("Job".to_string()))
    }

    /// Oldest waiting job, marked as running
    fn take_next(&mut self) -> Option<EmailJob> {
        while let Some(job_id) = self.waiting.pop_front() {
            if let Some(job) = self.jobs.get_mut(&job_id) {
                job.start();
                return Some(job.clone());
            }
        }
        None
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs still waiting for a worker, oldest first
    pub async fn pending(&self) -> Vec<EmailJob> {
        let state = self.state.lock().await;
        state
            .waiting
            .iter()
            .filter_map(|job_id| state.jobs.get(job_id).cloned())
            .collect()
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, job: EmailJob) -> AppResult<Uuid> {
        let job_id = job.id;
        {
            let mut state = self.state.lock().await;
            state.jobs.insert(job_id, job);
            state.waiting.push_back(job_id);
        }
        self.wakeup.notify_one();
        Ok(job_id)
    }

    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<EmailJob>> {
        let deadline = Instant::now() + Duration::from_secs(timeout_seconds);

        loop {
            let woken = self.wakeup.notified();
            let next = self.state.lock().await.take_next();
            if next.is_some() {
                return Ok(next);
            }
            if tokio::time::timeout_at(deadline, woken).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn get_job(&self, job_id: Uuid) -> AppResult<Option<EmailJob>> {
        Ok(self.state.lock().await.jobs.get(&job_id).cloned())
    }

    async fn complete_job(&self, job_id: Uuid) -> AppResult<()> {
        self.state.lock().await.job_mut(job_id)?.complete();
        Ok(())
    }

    async fn fail_job(
        &self,
        job_id: Uuid,
        error: String,
        retryable: bool,
    ) -> AppResult<JobStatus> {
        let mut state = self.state.lock().await;
        Ok(state.job_mut(job_id)?.fail(error, retryable))
    }

    async fn queue_length(&self) -> AppResult<u64> {
        Ok(self.state.lock().await.waiting.len() as u64)
    }

    async fn requeue(&self, job_id: Uuid) -> AppResult<()> {
        {
            let mut state = self.state.lock().await;
            state.job_mut(job_id)?.reset_for_retry()?;
            state.waiting.push_back(job_id);
        }
        self.wakeup.notify_one();
        Ok(())
    }
}
