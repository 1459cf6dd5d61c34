use uuid::Uuid;

use volunteer_match::models::{
    CreateOrganization, CreateProject, CreateUser, Organization, Project, Skill, User,
};
use volunteer_match::repositories::{
    InMemoryStore, OrganizationStore, ProjectStore, SkillStore, UserStore,
};

/// Factory for creating test data
pub struct Factory<'a> {
    store: &'a InMemoryStore,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(store: &'a InMemoryStore) -> Self {
        Self { store }
    }

    pub async fn create_organization(&self, name: &str) -> Organization {
        OrganizationStore::create(
            self.store,
            &CreateOrganization {
                name: name.to_string(),
                description: Some(format!("{} description", name)),
            },
        )
        .await
        .unwrap()
    }

    /// A volunteer with a unique email
    pub async fn create_volunteer(&self, notify: bool) -> User {
        let unique_id = Uuid::new_v4();
        self.create_user_with_email(&format!("volunteer-{}@example.com", unique_id), notify, None)
            .await
    }

    /// A staff member of the organization
    pub async fn create_staff(&self, organization: &Organization) -> User {
        let unique_id = Uuid::new_v4();
        self.create_user_with_email(
            &format!("staff-{}@example.org", unique_id),
            false,
            Some(organization.id),
        )
        .await
    }

    pub async fn create_user_with_email(
        &self,
        email: &str,
        notify: bool,
        organization_id: Option<i32>,
    ) -> User {
        UserStore::create(
            self.store,
            &CreateUser {
                email: email.to_string(),
                name: format!("User {}", email),
                notify,
                organization_id,
            },
        )
        .await
        .unwrap()
    }

    /// Persist a project directly, without notifications
    pub async fn create_project(&self, organization: &Organization, name: &str) -> Project {
        ProjectStore::create(self.store, &CreateProject::new(name, organization.id))
            .await
            .unwrap()
    }

    pub async fn create_skill(&self, name: &str) -> Skill {
        SkillStore::create(self.store, name).await.unwrap()
    }

    pub async fn tag_user(&self, user: &User, skill: &Skill, display_order: i32) {
        self.store
            .add_user_skill(user.id, skill.id, display_order)
            .await
            .unwrap();
    }

    pub async fn tag_project(&self, project: &Project, skill: &Skill, display_order: i32) {
        self.store
            .add_project_skill(project.id, skill.id, display_order)
            .await
            .unwrap();
    }
}
