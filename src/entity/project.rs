use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::ProjectStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: ProjectStatus,
    pub remote: bool,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_title_id: Option<i32>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(
        belongs_to = "super::job_title::Entity",
        from = "Column::JobTitleId",
        to = "super::job_title::Column::Id"
    )]
    JobTitle,
    #[sea_orm(has_many = "super::user_project::Entity")]
    UserProjects,
    #[sea_orm(has_many = "super::project_skill::Entity")]
    ProjectSkills,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::job_title::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobTitle.def()
    }
}

impl Related<super::user_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProjects.def()
    }
}

impl Related<super::project_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectSkills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
