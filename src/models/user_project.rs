use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;

/// A volunteer's engagement with a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum UserProjectStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    Applied,
    #[sea_orm(string_value = "B")]
    #[serde(rename = "B")]
    Bookmarked,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    Accepted,
    #[sea_orm(string_value = "D")]
    #[serde(rename = "D")]
    Declined,
}

impl UserProjectStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Applied => "A",
            Self::Bookmarked => "B",
            Self::Accepted => "C",
            Self::Declined => "D",
        }
    }

    /// Validate a status code coming from outside the crate
    pub fn parse(status: Option<&str>) -> Result<Self, AppError> {
        match status {
            Some(code) => code.parse(),
            None => Err(AppError::Validation("Project status is required".to_string())),
        }
    }
}

impl FromStr for UserProjectStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::Applied),
            "B" => Ok(Self::Bookmarked),
            "C" => Ok(Self::Accepted),
            "D" => Ok(Self::Declined),
            _ => Err(AppError::Validation(format!("Invalid project status: {s:?}"))),
        }
    }
}

impl fmt::Display for UserProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProject {
    pub id: i32,
    pub user_id: i32,
    pub project_id: i32,
    pub status: UserProjectStatus,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_closed_set() {
        assert_eq!(
            UserProjectStatus::parse(Some("A")).unwrap(),
            UserProjectStatus::Applied
        );
        assert_eq!(
            UserProjectStatus::parse(Some("B")).unwrap(),
            UserProjectStatus::Bookmarked
        );
        assert_eq!(
            UserProjectStatus::parse(Some("C")).unwrap(),
            UserProjectStatus::Accepted
        );
        assert_eq!(
            UserProjectStatus::parse(Some("D")).unwrap(),
            UserProjectStatus::Declined
        );
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for status in [None, Some(""), Some("E"), Some("a"), Some("AB"), Some(" A")] {
            let err = UserProjectStatus::parse(status).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{status:?}");
        }
    }
}
