use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entity::user_project::{self, ActiveModel, Column, Entity as UserProjectEntity};
use crate::error::{AppError, AppResult};
use crate::models::{UserProject, UserProjectStatus};
use crate::repositories::UserProjectStore;

/// Application row repository; the table is unique on (user, project, status)
#[derive(Clone)]
pub struct UserProjectRepository {
    db: DatabaseConnection,
}

impl UserProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserProjectStore for UserProjectRepository {
    async fn find_by_user_project_and_status(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<Vec<UserProject>> {
        let models = UserProjectEntity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(status))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_project(&self, project_id: i32) -> AppResult<Vec<UserProject>> {
        let models = UserProjectEntity::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn create(
        &self,
        user_id: i32,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<UserProject> {
        let model = ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            project_id: Set(project_id),
            status: Set(status),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        // A concurrent identical request loses on the unique index
        let result = model.insert(&self.db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Application".to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    async fn delete_by_project_and_status(
        &self,
        project_id: i32,
        status: UserProjectStatus,
    ) -> AppResult<u64> {
        let result = UserProjectEntity::delete_many()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(status))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

// Conversion from SeaORM model to our domain model
impl From<user_project::Model> for UserProject {
    fn from(m: user_project::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            project_id: m.project_id,
            status: m.status,
            created_at: m.created_at,
        }
    }
}
