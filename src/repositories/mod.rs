pub mod memory;
pub mod organization;
pub mod project;
pub mod skill;
pub mod user;
pub mod user_project;

pub use memory::InMemoryStore;
pub use organization::OrganizationRepository;
pub use project::ProjectRepository;
pub use skill::SkillRepository;
pub use user::UserRepository;
pub use user_project::UserProjectRepository;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{
    CreateOrganization, CreateProject, CreateUser, JobTitle, Organization, Page, PageRequest,
    Project, ProjectFilter, ProjectStatus, Skill, UpdateProject, User, UserProject,
    UserProjectStatus,
};

/// Project persistence
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Project>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Project>>;

    async fn find_by_name_and_organization(
        &self,
        name: &str,
        organization_id: i32,
    ) -> AppResult<Option<Project>>;

    /// All projects, newest id first
    async fn find_all(&self) -> AppResult<Vec<Project>>;

    /// Filtered search, newest id first; `None` returns everything as one page
    async fn search(
        &self,
        filter: &ProjectFilter,
        page: Option<PageRequest>,
    ) -> AppResult<Page<Project>>;

    async fn find_by_organization(
        &self,
        organization_id: i32,
        status: Option<ProjectStatus>,
    ) -> AppResult<Vec<Project>>;

    /// Projects the user has an application row for
    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<UserProjectStatus>,
    ) -> AppResult<Vec<Project>>;

    async fn create(&self, input: &CreateProject) -> AppResult<Project>;

    /// Overwrite mutable fields; `None` when the project does not exist
    async fn update(&self, input: &UpdateProject) -> AppResult<Option<Project>>;

    async fn update_image(&self, id: i32, image_url: Option<&str>) -> AppResult<()>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn find_job_titles(&self) -> AppResult<Vec<JobTitle>>;
}

/// Organization persistence
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Organization>>;

    async fn create(&self, input: &CreateOrganization) -> AppResult<Organization>;

    async fn set_project_updated_time(&self, id: i32, at: OffsetDateTime) -> AppResult<()>;
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn create(&self, input: &CreateUser) -> AppResult<User>;

    /// Staff of an organization, lowest id first
    async fn find_by_organization(&self, organization_id: i32) -> AppResult<Vec<User>>;

    /// Users subscribed to new-project notifications
    async fn find_subscribers(&self) -> AppResult<Vec<User>>;
}

/// Application rows linking users and projects
#[async_trait]
pub trait UserProjectStore: Send + Sync {
    async fn find_by_user_project_and_status(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<Vec<UserProject>>;

    async fn find_by_project(&self, project_id: i32) -> AppResult<Vec<UserProject>>;

    /// Insert a row; `Conflict` if the same status already exists for the pair
    async fn create(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<UserProject>;

    /// Returns the number of rows removed
    async fn delete_by_project_and_status(
        &self,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<u64>;
}

/// Skills and the user/project skill tags
#[async_trait]
pub trait SkillStore: Send + Sync {
    async fn create(&self, name: &str) -> AppResult<Skill>;

    /// Skill names for a user in display order
    async fn find_skills_for_user(&self, user_id: i32) -> AppResult<Vec<String>>;

    async fn find_skills_for_project(&self, project_id: i32) -> AppResult<Vec<Skill>>;

    async fn add_user_skill(&self, user_id: i32, skill_id: i32, display_order: i32)
        -> AppResult<()>;

    async fn add_project_skill(
        &self,
        project_id: i32,
        skill_id: i32,
        display_order: i32,
    ) -> AppResult<()>;

    /// Returns the number of rows removed
    async fn delete_project_skills(&self, project_id: i32) -> AppResult<u64>;
}

/// The full set of stores handed to the services
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub users: Arc<dyn UserStore>,
    pub user_projects: Arc<dyn UserProjectStore>,
    pub skills: Arc<dyn SkillStore>,
}

impl Stores {
    /// SeaORM repositories sharing one connection pool
    pub fn postgres(db: DatabaseConnection) -> Self {
        Self {
            projects: Arc::new(ProjectRepository::new(db.clone())),
            organizations: Arc::new(OrganizationRepository::new(db.clone())),
            users: Arc::new(UserRepository::new(db.clone())),
            user_projects: Arc::new(UserProjectRepository::new(db.clone())),
            skills: Arc::new(SkillRepository::new(db)),
        }
    }

    /// Every store backed by the same in-memory state
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            projects: Arc::new(store.clone()),
            organizations: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            user_projects: Arc::new(store.clone()),
            skills: Arc::new(store),
        }
    }
}
