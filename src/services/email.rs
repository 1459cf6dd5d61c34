use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;
use crate::queue::{EmailBody, EmailJob, EmailTemplate, JobQueue};

/// Sender address and recipient routing for outbound notifications
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub from_address: String,
    /// Send the application notice to the organization contact instead of the applicant
    pub application_notice_to_org: bool,
}

impl NotificationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            from_address: config.mail_from.clone(),
            application_notice_to_org: config.application_notice_to_org,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            from_address: "info@code4socialgood.org".to_string(),
            application_notice_to_org: false,
        }
    }
}

/// Fire-and-forget email API; messages are queued for the worker to deliver
#[derive(Clone)]
pub struct EmailService {
    queue: Arc<dyn JobQueue>,
    max_retries: u32,
}

impl EmailService {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self {
            queue,
            max_retries: 3,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Queue a plain-text email
    pub async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> AppResult<Uuid> {
        let body = EmailBody::Text {
            body: body.to_string(),
        };
        self.submit(EmailJob::new(from, to, subject, body)).await
    }

    /// Queue an email rendered from a template by the worker
    pub async fn send_with_context(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        template: EmailTemplate,
        context: serde_json::Value,
    ) -> AppResult<Uuid> {
        let body = EmailBody::Template { template, context };
        self.submit(EmailJob::new(from, to, subject, body)).await
    }

    async fn submit(&self, job: EmailJob) -> AppResult<Uuid> {
        let job = job.with_max_retries(self.max_retries);
        let job_id = self.queue.enqueue(job).await?;
        tracing::debug!(job_id = %job_id, "Email queued");
        Ok(job_id)
    }
}
