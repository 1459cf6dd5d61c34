use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Last time a project was posted under this organization
    pub project_updated_time: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub description: Option<String>,
}
