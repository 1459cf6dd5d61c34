use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    /// Wants an email whenever a new project is posted
    pub notify: bool,
    /// Set for organization staff
    pub organization_id: Option<i32>,
    pub created_at: OffsetDateTime,
}

/// User creation DTO (without id and timestamps)
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub notify: bool,
    pub organization_id: Option<i32>,
}
