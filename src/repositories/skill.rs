use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entity::skill::{self, ActiveModel, Entity as SkillEntity};
use crate::entity::{project_skill, user_skill};
use crate::error::{AppError, AppResult};
use crate::models::Skill;
use crate::repositories::SkillStore;

/// Skill repository, including the user and project tag tables
#[derive(Clone)]
pub struct SkillRepository {
    db: DatabaseConnection,
}

impl SkillRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SkillStore for SkillRepository {
    async fn create(&self, name: &str) -> AppResult<Skill> {
        let model = ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        };

        let result = model.insert(&self.db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Skill".to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    async fn find_skills_for_user(&self, user_id: i32) -> AppResult<Vec<String>> {
        let models = SkillEntity::find()
            .join(JoinType::InnerJoin, skill::Relation::UserSkills.def())
            .filter(user_skill::Column::UserId.eq(user_id))
            .order_by_asc(user_skill::Column::DisplayOrder)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.name).collect())
    }

    async fn find_skills_for_project(&self, project_id: i32) -> AppResult<Vec<Skill>> {
        let models = SkillEntity::find()
            .join(JoinType::InnerJoin, skill::Relation::ProjectSkills.def())
            .filter(project_skill::Column::ProjectId.eq(project_id))
            .order_by_asc(project_skill::Column::DisplayOrder)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn add_user_skill(
        &self,
        user_id: i32,
        skill_id: i32,
        display_order: i32,
    ) -> AppResult<()> {
        user_skill::ActiveModel {
            user_id: Set(user_id),
            skill_id: Set(skill_id),
            display_order: Set(display_order),
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }

    async fn add_project_skill(
        &self,
        project_id: i32,
        skill_id: i32,
        display_order: i32,
    ) -> AppResult<()> {
        project_skill::ActiveModel {
            project_id: Set(project_id),
            skill_id: Set(skill_id),
            display_order: Set(display_order),
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_project_skills(&self, project_id: i32) -> AppResult<u64> {
        let result = project_skill::Entity::delete_many()
            .filter(project_skill::Column::ProjectId.eq(project_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

// Conversion from SeaORM model to our domain model
impl From<skill::Model> for Skill {
    fn from(m: skill::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}
