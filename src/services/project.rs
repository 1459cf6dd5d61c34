use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProject, JobTitle, Page, PageRequest, Project, ProjectFilter, ProjectStatus,
    UpdateProject, UserProjectStatus,
};
use crate::repositories::Stores;
use crate::services::{EmailService, NotificationSettings, UrlService};

pub const SUBJECT_NEW_PROJECT: &str = "Code for Social Good: New Project Notification";
const BODY_NEW_PROJECT: &str = "You have registered to recieve notification on new projects.\n\
                                The following new project has been created:\n";

/// Project lifecycle: creation with subscriber notification, edits,
/// deletion and the per-organization draft
#[derive(Clone)]
pub struct ProjectService {
    stores: Stores,
    email: EmailService,
    urls: UrlService,
    settings: NotificationSettings,
}

impl ProjectService {
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

    pub async fn find_projects(&self) -> AppResult<Vec<Project>> {
        self.stores.projects.find_all().await
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Project> {
        self.stores
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        self.stores.projects.find_by_name(name).await
    }

    /// Filtered search; without a page size the whole result comes back as one page
    pub async fn search(
        &self,
        filter: &ProjectFilter,
        page: Option<u64>,
        size: Option<u64>,
    ) -> AppResult<Page<Project>> {
        self.stores
            .projects
            .search(filter, PageRequest::from_params(page, size))
            .await
    }

    pub async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<UserProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        self.stores.projects.find_by_user(user_id, status).await
    }

    /// Projects of an organization. Asking for drafts always yields exactly
    /// one: a blank draft is created when the organization has none.
    pub async fn find_by_organization(
        &self,
        organization_id: i32,
        status: Option<ProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        let projects = self
            .stores
            .projects
            .find_by_organization(organization_id, status)
            .await?;

        if status != Some(ProjectStatus::New) || !projects.is_empty() {
            return Ok(projects);
        }

        self.stores
            .organizations
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization".to_string()))?;

        let draft = match self
            .stores
            .projects
            .create(&CreateProject::draft(organization_id))
            .await
        {
            Ok(draft) => draft,
            Err(AppError::Conflict(_)) => {
                // Another request created the draft first
                return self
                    .stores
                    .projects
                    .find_by_organization(organization_id, status)
                    .await;
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            project_id = draft.id,
            organization_id,
            "Draft project created"
        );

        Ok(vec![draft])
    }

    /// Create a project, or return the existing one with the same name in the
    /// same organization
    pub async fn create_project(&self, input: &CreateProject) -> AppResult<Project> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Project name is required".to_string()));
        }

        if let Some(existing) = self
            .stores
            .projects
            .find_by_name_and_organization(&input.name, input.organization_id)
            .await?
        {
            tracing::info!(
                project_id = existing.id,
                organization_id = input.organization_id,
                "Project already exists"
            );
            return Ok(existing);
        }

        self.stores
            .organizations
            .find_by_id(input.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization".to_string()))?;

        let project = self.stores.projects.create(input).await?;

        self.stores
            .organizations
            .set_project_updated_time(input.organization_id, OffsetDateTime::now_utc())
            .await?;

        self.notify_subscribers(&project).await;

        Ok(project)
    }

    /// Overwrite a project's mutable fields; `None` when it does not exist
    pub async fn update_project(&self, input: &UpdateProject) -> AppResult<Option<Project>> {
        let updated = self.stores.projects.update(input).await?;
        if updated.is_none() {
            tracing::info!(project_id = input.id, "Project does not exist");
        }
        Ok(updated)
    }

    /// Delete a project with its bookmarks and skill tags. Unknown ids are ignored.
    /// Projects with application history are refused before anything is removed.
    pub async fn delete_project(&self, id: i32) -> AppResult<()> {
        if self.stores.projects.find_by_id(id).await?.is_none() {
            tracing::info!(project_id = id, "Project does not exist");
            return Ok(());
        }

        let history = self.stores.user_projects.find_by_project(id).await?;
        if history
            .iter()
            .any(|up| up.status != UserProjectStatus::Bookmarked)
        {
            tracing::info!(project_id = id, "Project has application history, not deleted");
            return Err(AppError::Referenced("Project".to_string()));
        }

        let bookmarks = self
            .stores
            .user_projects
            .delete_by_project_and_status(id, UserProjectStatus::Bookmarked)
            .await?;
        let skills = self.stores.skills.delete_project_skills(id).await?;

        self.stores.projects.delete(id).await?;

        tracing::info!(project_id = id, bookmarks, skills, "Project deleted");
        Ok(())
    }

    pub async fn find_job_titles(&self) -> AppResult<Vec<JobTitle>> {
        self.stores.projects.find_job_titles().await
    }

    /// Set or clear the project's image location
    pub async fn save_image(&self, id: i32, image_url: Option<&str>) -> AppResult<()> {
        self.find_by_id(id).await?;
        self.stores.projects.update_image(id, image_url).await
    }

    async fn notify_subscribers(&self, project: &Project) {
        let subscribers = match self.stores.users.find_subscribers().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(project_id = project.id, error = %e, "Failed to load subscribers");
                return;
            }
        };

        let body = format!("{}{}", BODY_NEW_PROJECT, self.urls.project_url(project.id));

        for user in subscribers.iter().filter(|u| !u.email.is_empty()) {
            if let Err(e) = self
                .email
                .send(
                    &self.settings.from_address,
                    &user.email,
                    SUBJECT_NEW_PROJECT,
                    &body,
                )
                .await
            {
                tracing::warn!(
                    project_id = project.id,
                    user_id = user.id,
                    error = %e,
                    "Failed to queue new project notification"
                );
            }
        }

        tracing::debug!(
            project_id = project.id,
            recipients = subscribers.len(),
            "New project notifications queued"
        );
    }
}
