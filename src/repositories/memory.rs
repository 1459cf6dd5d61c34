use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateOrganization, CreateProject, CreateUser, JobTitle, Organization, Page, PageRequest,
    Project, ProjectFilter, ProjectStatus, Skill, UpdateProject, User, UserProject,
    UserProjectStatus,
};
use crate::repositories::{
    OrganizationStore, ProjectStore, SkillStore, UserProjectStore, UserStore,
};

/// In-memory implementation of every store, for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    next_id: i32,
    organizations: BTreeMap<i32, Organization>,
    projects: BTreeMap<i32, Project>,
    users: BTreeMap<i32, User>,
    user_projects: BTreeMap<i32, UserProject>,
    skills: BTreeMap<i32, Skill>,
    job_titles: BTreeMap<i32, JobTitle>,
    /// (user_id, skill_id, display_order)
    user_skills: Vec<(i32, i32, i32)>,
    /// (project_id, skill_id, display_order)
    project_skills: Vec<(i32, i32, i32)>,
}

impl InMemoryStoreInner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn skills_of_project(&self, project_id: i32) -> Vec<i32> {
        self.project_skills
            .iter()
            .filter(|(p, _, _)| *p == project_id)
            .map(|(_, s, _)| *s)
            .collect()
    }

    /// Whether the organization already has a draft other than `except`
    fn has_draft(&self, organization_id: i32, except: Option<i32>) -> bool {
        self.projects.values().any(|p| {
            p.organization_id == organization_id
                && p.status == ProjectStatus::New
                && Some(p.id) != except
        })
    }

    /// Newest id first
    fn projects_desc(&self) -> impl Iterator<Item = &Project> {
        self.projects.values().rev()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a job title lookup row
    pub async fn add_job_title(&self, name: &str, display_order: i32) -> JobTitle {
        let mut inner = self.inner.lock().await;
        let job_title = JobTitle {
            id: inner.next_id(),
            name: name.to_string(),
            display_order,
        };
        inner.job_titles.insert(job_title.id, job_title.clone());
        job_title
    }

    /// Number of skill tags on a project
    pub async fn project_skill_count(&self, project_id: i32) -> usize {
        let inner = self.inner.lock().await;
        inner.skills_of_project(project_id).len()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.projects.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.projects.values().find(|p| p.name == name).cloned())
    }

    async fn find_by_name_and_organization(
        &self,
        name: &str,
        organization_id: i32,
    ) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .projects
            .values()
            .find(|p| p.name == name && p.organization_id == organization_id)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.projects_desc().cloned().collect())
    }

    async fn search(
        &self,
        filter: &ProjectFilter,
        page: Option<PageRequest>,
    ) -> AppResult<Page<Project>> {
        let inner = self.inner.lock().await;
        let matching: Vec<Project> = inner
            .projects_desc()
            .filter(|p| filter.matches(p, &inner.skills_of_project(p.id)))
            .cloned()
            .collect();

        Ok(Page::slice(matching, page))
    }

    async fn find_by_organization(
        &self,
        organization_id: i32,
        status: Option<ProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .projects_desc()
            .filter(|p| p.organization_id == organization_id)
            .filter(|p| status.map_or(true, |s| s == p.status))
            .cloned()
            .collect())
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<UserProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        let applied: Vec<i32> = inner
            .user_projects
            .values()
            .filter(|up| up.user_id == user_id)
            .filter(|up| status.map_or(true, |s| s == up.status))
            .map(|up| up.project_id)
            .collect();

        Ok(inner
            .projects_desc()
            .filter(|p| applied.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, input: &CreateProject) -> AppResult<Project> {
        let mut inner = self.inner.lock().await;
        if !inner.organizations.contains_key(&input.organization_id) {
            return Err(AppError::NotFound("Organization".to_string()));
        }
        let status = input.status_or_default();
        if status == ProjectStatus::New && inner.has_draft(input.organization_id, None) {
            return Err(AppError::Conflict("Draft project".to_string()));
        }

        let now = OffsetDateTime::now_utc();
        let project = Project {
            id: inner.next_id(),
            organization_id: input.organization_id,
            name: input.name.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            status,
            remote: input.remote_or_default(),
            city: input.city.clone(),
            country: input.country.clone(),
            job_title_id: input.job_title_id,
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update(&self, input: &UpdateProject) -> AppResult<Option<Project>> {
        let mut inner = self.inner.lock().await;
        let Some(organization_id) = inner.projects.get(&input.id).map(|p| p.organization_id) else {
            return Ok(None);
        };
        if input.status == ProjectStatus::New && inner.has_draft(organization_id, Some(input.id)) {
            return Err(AppError::Conflict("Draft project".to_string()));
        }
        let Some(project) = inner.projects.get_mut(&input.id) else {
            return Ok(None);
        };

        project.name = input.name.clone();
        project.description = input.description.clone();
        project.image_url = input.image_url.clone();
        project.status = input.status;
        project.remote = input.remote;
        project.city = input.city.clone();
        project.country = input.country.clone();
        project.job_title_id = input.job_title_id;
        project.updated_at = OffsetDateTime::now_utc();

        Ok(Some(project.clone()))
    }

    async fn update_image(&self, id: i32, image_url: Option<&str>) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;
        project.image_url = image_url.map(str::to_string);
        project.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.projects.contains_key(&id) {
            return Err(AppError::NotFound("Project".to_string()));
        }

        // Same referential rules as the Postgres schema
        let referenced = inner.user_projects.values().any(|up| up.project_id == id)
            || inner.project_skills.iter().any(|(p, _, _)| *p == id);
        if referenced {
            return Err(AppError::Referenced("Project".to_string()));
        }

        inner.projects.remove(&id);
        Ok(())
    }

    async fn find_job_titles(&self) -> AppResult<Vec<JobTitle>> {
        let inner = self.inner.lock().await;
        let mut job_titles: Vec<JobTitle> = inner.job_titles.values().cloned().collect();
        job_titles.sort_by_key(|j| (j.display_order, j.id));
        Ok(job_titles)
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Organization>> {
        let inner = self.inner.lock().await;
        Ok(inner.organizations.get(&id).cloned())
    }

    async fn create(&self, input: &CreateOrganization) -> AppResult<Organization> {
        let mut inner = self.inner.lock().await;
        let organization = Organization {
            id: inner.next_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            project_updated_time: None,
            created_at: OffsetDateTime::now_utc(),
        };
        inner
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn set_project_updated_time(&self, id: i32, at: OffsetDateTime) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let organization = inner
            .organizations
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Organization".to_string()))?;
        organization.project_updated_time = Some(at);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create(&self, input: &CreateUser) -> AppResult<User> {
        let mut inner = self.inner.lock().await;
        if !input.email.is_empty() && inner.users.values().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email".to_string()));
        }

        let user = User {
            id: inner.next_id(),
            email: input.email.clone(),
            name: input.name.clone(),
            notify: input.notify,
            organization_id: input.organization_id,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_organization(&self, organization_id: i32) -> AppResult<Vec<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .filter(|u| u.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn find_subscribers(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().filter(|u| u.notify).cloned().collect())
    }
}

#[async_trait]
impl UserProjectStore for InMemoryStore {
    async fn find_by_user_project_and_status(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<Vec<UserProject>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .user_projects
            .values()
            .filter(|up| up.user_id == user_id && up.project_id == project_id)
            .filter(|up| up.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_project(&self, project_id: i32) -> AppResult<Vec<UserProject>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .user_projects
            .values()
            .filter(|up| up.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<UserProject> {
        // Check and insert under one lock, like the unique index
        let mut inner = self.inner.lock().await;
        let duplicate = inner.user_projects.values().any(|up| {
            up.user_id == user_id && up.project_id == project_id && up.status == status
        });
        if duplicate {
            return Err(AppError::Conflict("Application".to_string()));
        }

        let user_project = UserProject {
            id: inner.next_id(),
            user_id,
            project_id,
            status,
            created_at: OffsetDateTime::now_utc(),
        };
        inner
            .user_projects
            .insert(user_project.id, user_project.clone());
        Ok(user_project)
    }

    async fn delete_by_project_and_status(
        &self,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.user_projects.len();
        inner
            .user_projects
            .retain(|_, up| !(up.project_id == project_id && up.status == status));
        Ok((before - inner.user_projects.len()) as u64)
    }
}

#[async_trait]
impl SkillStore for InMemoryStore {
    async fn create(&self, name: &str) -> AppResult<Skill> {
        let mut inner = self.inner.lock().await;
        if inner.skills.values().any(|s| s.name == name) {
            return Err(AppError::Conflict("Skill".to_string()));
        }

        let skill = Skill {
            id: inner.next_id(),
            name: name.to_string(),
        };
        inner.skills.insert(skill.id, skill.clone());
        Ok(skill)
    }

    async fn find_skills_for_user(&self, user_id: i32) -> AppResult<Vec<String>> {
        let inner = self.inner.lock().await;
        let mut tags: Vec<&(i32, i32, i32)> = inner
            .user_skills
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .collect();
        tags.sort_by_key(|(_, _, order)| *order);

        Ok(tags
            .into_iter()
            .filter_map(|(_, skill_id, _)| inner.skills.get(skill_id))
            .map(|s| s.name.clone())
            .collect())
    }

    async fn find_skills_for_project(&self, project_id: i32) -> AppResult<Vec<Skill>> {
        let inner = self.inner.lock().await;
        let mut tags: Vec<&(i32, i32, i32)> = inner
            .project_skills
            .iter()
            .filter(|(p, _, _)| *p == project_id)
            .collect();
        tags.sort_by_key(|(_, _, order)| *order);

        Ok(tags
            .into_iter()
            .filter_map(|(_, skill_id, _)| inner.skills.get(skill_id))
            .cloned()
            .collect())
    }

    async fn add_user_skill(
        &self,
        user_id: i32,
        skill_id: i32,
        display_order: i32,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.user_skills.push((user_id, skill_id, display_order));
        Ok(())
    }

    async fn add_project_skill(
        &self,
        project_id: i32,
        skill_id: i32,
        display_order: i32,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.project_skills.push((project_id, skill_id, display_order));
        Ok(())
    }

    async fn delete_project_skills(&self, project_id: i32) -> AppResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.project_skills.len();
        inner.project_skills.retain(|(p, _, _)| *p != project_id);
        Ok((before - inner.project_skills.len()) as u64)
    }
}
