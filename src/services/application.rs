use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Organization, Project, User, UserProjectStatus};
use crate::queue::EmailTemplate;
use crate::repositories::Stores;
use crate::services::{EmailService, NotificationSettings, UrlService};

pub const SUBJECT_ORGANIZATION: &str = "You received an application from Code for Social Good";
pub const SUBJECT_APPLICANT: &str = "Your C4SG Application was created";
const BODY_ORGANIZATION: &str = "You received an application from Code for Social Good. \
                                 Please login to the dashboard to review the application.";

#[derive(Serialize)]
struct VolunteerApplicationContext<'a> {
    user: &'a User,
    skills: &'a [String],
    project: &'a Project,
    message: &'a str,
}

#[derive(Serialize)]
struct ApplicantApplicationContext<'a> {
    org: &'a Organization,
    /// Organization contact the applicant can reach out to
    user: &'a User,
    #[serde(rename = "projectLink")]
    project_link: String,
    project: &'a Project,
}

/// Records volunteers' applications, bookmarks and decisions on projects
#[derive(Clone)]
pub struct ApplicationService {
    stores: Stores,
    email: EmailService,
    urls: UrlService,
    settings: NotificationSettings,
}

impl ApplicationService {
    pub fn new(
        stores: Stores,
        email: EmailService,
        urls: UrlService,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            stores,
            email,
            urls,
            settings,
        }
    }

    /// Record a (user, project, status) row. Each status can be recorded once
    /// per pair. An application (`A`) notifies the organization and the applicant.
    pub async fn record_application(
        &self,
        user_id: i32,
        project_id: i32,
        status: Option<&str>,
    ) -> AppResult<Project> {
        let user = self
            .stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let project = self
            .stores
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        let status = UserProjectStatus::parse(status)?;

        let existing = self
            .stores
            .user_projects
            .find_by_user_project_and_status(user_id, project_id, status)
            .await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict(format!(
                "Status {} for user {} on project {}",
                status, user_id, project_id
            )));
        }

        self.stores
            .user_projects
            .create(user_id, project_id, status)
            .await?;

        tracing::debug!(user_id, project_id, status = %status, "User project recorded");

        if status == UserProjectStatus::Applied {
            if let Err(e) = self.notify_application(&user, &project).await {
                tracing::warn!(
                    user_id,
                    project_id,
                    error = %e,
                    "Failed to queue application notifications"
                );
            }
        }

        Ok(project)
    }

    async fn notify_application(&self, applicant: &User, project: &Project) -> AppResult<()> {
        let staff = self
            .stores
            .users
            .find_by_organization(project.organization_id)
            .await?;

        let Some(contact) = staff.first() else {
            tracing::debug!(
                project_id = project.id,
                organization_id = project.organization_id,
                "Organization has no users, skipping application notifications"
            );
            return Ok(());
        };

        let skills = self.stores.skills.find_skills_for_user(applicant.id).await?;

        let notice_to = if self.settings.application_notice_to_org {
            contact.email.as_str()
        } else {
            applicant.email.as_str()
        };

        if !notice_to.is_empty() {
            let context = to_context(&VolunteerApplicationContext {
                user: applicant,
                skills: &skills,
                project,
                message: BODY_ORGANIZATION,
            })?;
            if let Err(e) = self
                .email
                .send_with_context(
                    &self.settings.from_address,
                    notice_to,
                    SUBJECT_ORGANIZATION,
                    EmailTemplate::VolunteerApplication,
                    context,
                )
                .await
            {
                tracing::warn!(project_id = project.id, error = %e, "Failed to queue organization notice");
            }
        }

        let organization = self
            .stores
            .organizations
            .find_by_id(project.organization_id)
            .await?;

        if let Some(org) = organization.filter(|_| !applicant.email.is_empty()) {
            let context = to_context(&ApplicantApplicationContext {
                org: &org,
                user: contact,
                project_link: self.urls.project_url(project.id),
                project,
            })?;
            self.email
                .send_with_context(
                    &self.settings.from_address,
                    &applicant.email,
                    SUBJECT_APPLICANT,
                    EmailTemplate::ApplicantApplication,
                    context,
                )
                .await?;
        }

        tracing::info!(
            project_id = project.id,
            applicant_id = applicant.id,
            org_email = %contact.email,
            "Application emails queued"
        );

        Ok(())
    }
}

fn to_context<T: Serialize>(context: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(context)
        .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))
}
