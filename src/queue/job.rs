use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Job status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting in queue
    Pending,
    /// Job is currently being delivered
    Running,
    /// Email handed to the transport
    Completed,
    /// Delivery failed (may be retried)
    Failed,
    /// Delivery failed permanently (max retries exceeded)
    Dead,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Dead)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Dead => "dead",
        }
    }
}

/// Named message layouts rendered by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailTemplate {
    /// Application notice carrying the applicant's profile and skills
    VolunteerApplication,
    /// Confirmation to the applicant with a link to the project
    ApplicantApplication,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VolunteerApplication => "volunteer-application",
            Self::ApplicantApplication => "applicant-application",
        }
    }
}

/// Message body: literal text or a template plus its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmailBody {
    Text {
        body: String,
    },
    Template {
        template: EmailTemplate,
        context: serde_json::Value,
    },
}

/// Email job submitted to the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailJob {
    /// Unique job identifier
    pub id: Uuid,

    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,

    /// Current status
    pub status: JobStatus,

    /// Retry information
    pub retry_count: u32,
    pub max_retries: u32,

    /// Timestamps
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,

    /// Error message if failed
    pub error_message: Option<String>,
}

impl EmailJob {
    pub fn new(from: &str, to: &str, subject: &str, body: EmailBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body,
            status: JobStatus::Pending,
            retry_count: 0,
            max_retries: 3,
            created_at: OffsetDateTime::now_utc(),
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Template used for the body, if any
    pub fn template(&self) -> Option<EmailTemplate> {
        match &self.body {
            EmailBody::Template { template, .. } => Some(*template),
            EmailBody::Text { .. } => None,
        }
    }

    /// Handed to a worker
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(OffsetDateTime::now_utc());
    }

    /// Delivered
    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(OffsetDateTime::now_utc());
    }

    /// Record a delivery failure. Retryable failures consume one retry while
    /// any are left; everything else ends the job as `Dead`.
    pub fn fail(&mut self, error: String, retryable: bool) -> JobStatus {
        self.error_message = Some(error);
        if retryable && self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.status = JobStatus::Failed;
        } else {
            self.status = JobStatus::Dead;
            self.completed_at = Some(OffsetDateTime::now_utc());
        }
        self.status
    }

    /// Put a failed job back to pending
    pub fn reset_for_retry(&mut self) -> AppResult<()> {
        if self.status != JobStatus::Failed {
            return Err(AppError::Validation(format!(
                "Job {} is {}, only failed jobs can be requeued",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = JobStatus::Pending;
        self.started_at = None;
        Ok(())
    }
}
