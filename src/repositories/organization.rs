use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, Set};
use time::OffsetDateTime;

use crate::entity::organization::{self, ActiveModel, Entity as OrganizationEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateOrganization, Organization};
use crate::repositories::OrganizationStore;

/// Organization repository for database operations
#[derive(Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Organization>> {
        let model = OrganizationEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: &CreateOrganization) -> AppResult<Organization> {
        let model = ActiveModel {
            id: NotSet,
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            project_updated_time: Set(None),
            created_at: Set(OffsetDateTime::now_utc()),
        };

        let result = model.insert(&self.db).await?;
        Ok(result.into())
    }

    async fn set_project_updated_time(&self, id: i32, at: OffsetDateTime) -> AppResult<()> {
        let model = OrganizationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.project_updated_time = Set(Some(at));
        active.update(&self.db).await?;

        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl From<organization::Model> for Organization {
    fn from(m: organization::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            project_updated_time: m.project_updated_time,
            created_at: m.created_at,
        }
    }
}
