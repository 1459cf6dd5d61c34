use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use crate::entity::job_title::{self, Entity as JobTitleEntity};
use crate::entity::project::{self, ActiveModel, Column, Entity as ProjectEntity};
use crate::entity::{project_skill, user_project};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProject, JobTitle, Page, PageRequest, Project, ProjectFilter, ProjectStatus,
    UpdateProject, UserProjectStatus,
};
use crate::repositories::ProjectStore;

/// Project repository for database operations
#[derive(Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Translate a search filter into a query
    fn filtered(filter: &ProjectFilter) -> Select<ProjectEntity> {
        let mut query = ProjectEntity::find();

        if let Some(keyword) = filter.keyword_pattern() {
            let pattern = format!("%{}%", keyword);
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern)),
            );
        }
        if let Some(job_title_id) = filter.job_title_id {
            query = query.filter(Column::JobTitleId.eq(job_title_id));
        }
        if let Some(skills) = &filter.skills {
            query = query.filter(
                Column::Id.in_subquery(
                    Query::select()
                        .column(project_skill::Column::ProjectId)
                        .from(project_skill::Entity)
                        .and_where(project_skill::Column::SkillId.is_in(skills.iter().copied()))
                        .to_owned(),
                ),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status));
        }
        if let Some(remote) = filter.remote {
            query = query.filter(Column::Remote.eq(remote));
        }

        query.order_by_desc(Column::Id)
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Project>> {
        let model = ProjectEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        let model = ProjectEntity::find()
            .filter(Column::Name.eq(name))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_name_and_organization(
        &self,
        name: &str,
        organization_id: i32,
    ) -> AppResult<Option<Project>> {
        let model = ProjectEntity::find()
            .filter(Column::Name.eq(name))
            .filter(Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_all(&self) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn search(
        &self,
        filter: &ProjectFilter,
        page: Option<PageRequest>,
    ) -> AppResult<Page<Project>> {
        let query = Self::filtered(filter);

        let Some(request) = page else {
            let models = query.all(&self.db).await?;
            return Ok(Page::unpaged(models.into_iter().map(|m| m.into()).collect()));
        };

        let paginator = query.paginate(&self.db, request.size);
        let total = paginator.num_items().await?;
        if request.page.saturating_mul(request.size) >= total {
            return Ok(Page::new(Vec::new(), total, request));
        }
        let models = paginator.fetch_page(request.page).await?;

        Ok(Page::new(
            models.into_iter().map(|m| m.into()).collect(),
            total,
            request,
        ))
    }

    async fn find_by_organization(
        &self,
        organization_id: i32,
        status: Option<ProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        let mut query = ProjectEntity::find().filter(Column::OrganizationId.eq(organization_id));
        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status));
        }

        let models = query.order_by_desc(Column::Id).all(&self.db).await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<UserProjectStatus>,
    ) -> AppResult<Vec<Project>> {
        let mut applied = Query::select()
            .column(user_project::Column::ProjectId)
            .from(user_project::Entity)
            .and_where(user_project::Column::UserId.eq(user_id))
            .to_owned();
        if let Some(status) = status {
            applied.and_where(user_project::Column::Status.eq(status));
        }

        let models = ProjectEntity::find()
            .filter(Column::Id.in_subquery(applied))
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, input: &CreateProject) -> AppResult<Project> {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            id: NotSet,
            organization_id: Set(input.organization_id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            image_url: Set(input.image_url.clone()),
            status: Set(input.status_or_default()),
            remote: Set(input.remote_or_default()),
            city: Set(input.city.clone()),
            country: Set(input.country.clone()),
            job_title_id: Set(input.job_title_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        Ok(result.into())
    }

    async fn update(&self, input: &UpdateProject) -> AppResult<Option<Project>> {
        let Some(model) = ProjectEntity::find_by_id(input.id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.into();
        active.name = Set(input.name.clone());
        active.description = Set(input.description.clone());
        active.image_url = Set(input.image_url.clone());
        active.status = Set(input.status);
        active.remote = Set(input.remote);
        active.city = Set(input.city.clone());
        active.country = Set(input.country.clone());
        active.job_title_id = Set(input.job_title_id);
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        Ok(Some(result.into()))
    }

    async fn update_image(&self, id: i32, image_url: Option<&str>) -> AppResult<()> {
        let result = ProjectEntity::update_many()
            .col_expr(Column::ImageUrl, Expr::value(image_url.map(str::to_string)))
            .col_expr(Column::UpdatedAt, Expr::value(time::OffsetDateTime::now_utc()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = ProjectEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Project".to_string()));
        }

        Ok(())
    }

    async fn find_job_titles(&self) -> AppResult<Vec<JobTitle>> {
        let models = JobTitleEntity::find()
            .order_by_asc(job_title::Column::DisplayOrder)
            .order_by_asc(job_title::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            organization_id: m.organization_id,
            name: m.name,
            description: m.description,
            image_url: m.image_url,
            status: m.status,
            remote: m.remote,
            city: m.city,
            country: m.country,
            job_title_id: m.job_title_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<job_title::Model> for JobTitle {
    fn from(m: job_title::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            display_order: m.display_order,
        }
    }
}
