use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, User};
use crate::repositories::UserStore;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: &CreateUser) -> AppResult<User> {
        let model = ActiveModel {
            id: NotSet,
            email: Set(input.email.clone()),
            name: Set(input.name.clone()),
            notify: Set(input.notify),
            organization_id: Set(input.organization_id),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        let result = model.insert(&self.db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Email".to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    async fn find_by_organization(&self, organization_id: i32) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(Column::OrganizationId.eq(organization_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_subscribers(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(Column::Notify.eq(true))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            notify: m.notify,
            organization_id: m.organization_id,
            created_at: m.created_at,
        }
    }
}
