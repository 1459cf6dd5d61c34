use std::sync::Arc;

use volunteer_match::error::AppResult;
use volunteer_match::queue::{EmailJob, JobQueue, JobStatus};
use volunteer_match::services::{Mailer, OutgoingEmail};

/// Renders queued email jobs and hands them to the mailer
pub struct JobExecutor {
    queue: Arc<dyn JobQueue>,
    mailer: Arc<dyn Mailer>,
}

impl JobExecutor {
    pub fn new(queue: Arc<dyn JobQueue>, mailer: Arc<dyn Mailer>) -> Self {
        Self { queue, mailer }
    }

    /// Deliver one job and record the outcome; returns the job's new status
    pub async fn execute(&self, job: EmailJob) -> AppResult<JobStatus> {
        let job_id = job.id;

        let delivery = match OutgoingEmail::from_job(&job) {
            Ok(email) => self.mailer.deliver(&email).await,
            Err(e) => Err(e),
        };

        match delivery {
            Ok(()) => {
                self.queue.complete_job(job_id).await?;
                Ok(JobStatus::Completed)
            }
            Err(e) => {
                let retryable = e.is_retryable();
                tracing::error!(
                    job_id = %job_id,
                    to = %job.to,
                    error = %e,
                    retryable,
                    "Email delivery failed"
                );

                let status = self.queue.fail_job(job_id, e.to_string(), retryable).await?;
                if status == JobStatus::Failed {
                    self.queue.requeue(job_id).await?;
                    return Ok(JobStatus::Pending);
                }
                Ok(status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use volunteer_match::queue::{EmailBody, EmailTemplate, InMemoryQueue};
    use volunteer_match::services::MailError;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn deliver(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    struct RejectingMailer;

    #[async_trait]
    impl Mailer for RejectingMailer {
        async fn deliver(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
            Err(MailError::Build("rejected".to_string()))
        }
    }

    async fn dequeue_one(queue: &InMemoryQueue, job: EmailJob) -> EmailJob {
        queue.enqueue(job).await.unwrap();
        queue.dequeue(1).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_delivered_job_is_completed() {
        let queue = InMemoryQueue::new();
        let mailer = Arc::new(RecordingMailer::default());
        let executor = JobExecutor::new(Arc::new(queue.clone()), mailer.clone());

        let job = dequeue_one(
            &queue,
            EmailJob::new(
                "info@code4socialgood.org",
                "volunteer@example.com",
                "Your C4SG Application was created",
                EmailBody::Template {
                    template: EmailTemplate::ApplicantApplication,
                    context: serde_json::json!({
                        "org": { "name": "Food Bank" },
                        "user": { "name": "Grace", "email": "staff@foodbank.org" },
                        "projectLink": "http://dev.code4socialgood.org/project/view/9",
                        "project": { "name": "Website" }
                    }),
                },
            ),
        )
        .await;
        let job_id = job.id;

        let status = executor.execute(job).await.unwrap();
        assert_eq!(status, JobStatus::Completed);

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("/project/view/9"));

        let stored = queue.get_job(job_id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_dead() {
        let queue = InMemoryQueue::new();
        let executor = JobExecutor::new(Arc::new(queue.clone()), Arc::new(RejectingMailer));

        let job = dequeue_one(
            &queue,
            EmailJob::new(
                "info@code4socialgood.org",
                "volunteer@example.com",
                "Subject",
                EmailBody::Text {
                    body: "Body".to_string(),
                },
            ),
        )
        .await;
        let job_id = job.id;

        let status = executor.execute(job).await.unwrap();
        assert_eq!(status, JobStatus::Dead);
        assert_eq!(queue.queue_length().await.unwrap(), 0);

        let stored = queue.get_job(job_id).await.unwrap().unwrap();
        assert_eq!(stored.error_message.as_deref(), Some("Email build error: rejected"));
    }

    #[tokio::test]
    async fn test_render_failure_is_not_retried() {
        let queue = InMemoryQueue::new();
        let mailer = Arc::new(RecordingMailer::default());
        let executor = JobExecutor::new(Arc::new(queue.clone()), mailer.clone());

        let job = dequeue_one(
            &queue,
            EmailJob::new(
                "info@code4socialgood.org",
                "volunteer@example.com",
                "Subject",
                EmailBody::Template {
                    template: EmailTemplate::VolunteerApplication,
                    context: serde_json::json!(["not", "an", "object"]),
                },
            ),
        )
        .await;

        let status = executor.execute(job).await.unwrap();
        assert_eq!(status, JobStatus::Dead);
        assert!(mailer.sent.lock().await.is_empty());
    }
}
