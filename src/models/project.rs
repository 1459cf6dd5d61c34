use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;

/// Project lifecycle status, stored as a one-character code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum ProjectStatus {
    /// Draft project, one per organization
    #[sea_orm(string_value = "N")]
    #[serde(rename = "N")]
    New,
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    Active,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    Closed,
}

impl ProjectStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::New => "N",
            Self::Active => "A",
            Self::Closed => "C",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::New),
            "A" => Ok(Self::Active),
            "C" => Ok(Self::Closed),
            _ => Err(AppError::Validation(format!("Invalid project status: {s:?}"))),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub organization_id: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<ProjectStatus>,
    pub remote: Option<bool>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_title_id: Option<i32>,
}

impl CreateProject {
    /// Minimal project posted by an organization
    pub fn new(name: impl Into<String>, organization_id: i32) -> Self {
        Self {
            name: name.into(),
            organization_id,
            description: None,
            image_url: None,
            status: None,
            remote: None,
            city: None,
            country: None,
            job_title_id: None,
        }
    }

    /// Empty draft kept around so every organization has one to edit
    pub fn draft(organization_id: i32) -> Self {
        Self {
            status: Some(ProjectStatus::New),
            remote: Some(true),
            ..Self::new("", organization_id)
        }
    }

    pub fn status_or_default(&self) -> ProjectStatus {
        self.status.unwrap_or(ProjectStatus::Active)
    }

    pub fn remote_or_default(&self) -> bool {
        self.remote.unwrap_or(true)
    }
}

/// Full overwrite of a project's mutable fields
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: ProjectStatus,
    pub remote: bool,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_title_id: Option<i32>,
}

impl From<Project> for UpdateProject {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            status: p.status,
            remote: p.remote,
            city: p.city,
            country: p.country,
            job_title_id: p.job_title_id,
        }
    }
}

/// Search criteria; `None` fields do not filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub keyword: Option<String>,
    pub job_title_id: Option<i32>,
    /// Matches projects tagged with any of these skill ids
    pub skills: Option<Vec<i32>>,
    pub status: Option<ProjectStatus>,
    pub remote: Option<bool>,
}

impl ProjectFilter {
    /// Keyword normalised for case-insensitive matching, blank treated as absent
    pub fn keyword_pattern(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, project: &Project, project_skills: &[i32]) -> bool {
        if let Some(keyword) = self.keyword_pattern() {
            let in_name = project.name.to_lowercase().contains(&keyword);
            let in_description = project
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&keyword));
            if !in_name && !in_description {
                return false;
            }
        }
        if self.job_title_id.is_some() && project.job_title_id != self.job_title_id {
            return false;
        }
        if let Some(skills) = &self.skills {
            if !skills.iter().any(|s| project_skills.contains(s)) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != project.status) {
            return false;
        }
        if self.remote.is_some_and(|r| r != project.remote) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTitle {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, description: Option<&str>) -> Project {
        let now = OffsetDateTime::now_utc();
        Project {
            id: 1,
            organization_id: 1,
            name: name.to_string(),
            description: description.map(str::to_string),
            image_url: None,
            status: ProjectStatus::Active,
            remote: true,
            city: None,
            country: None,
            job_title_id: Some(3),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!("N".parse::<ProjectStatus>().unwrap(), ProjectStatus::New);
        assert_eq!(ProjectStatus::Closed.to_string(), "C");
        assert!("X".parse::<ProjectStatus>().is_err());
        assert!("n".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&ProjectStatus::New).unwrap();
        assert_eq!(json, "\"N\"");
    }

    #[test]
    fn test_draft_defaults() {
        let draft = CreateProject::draft(7);
        assert_eq!(draft.organization_id, 7);
        assert_eq!(draft.status_or_default(), ProjectStatus::New);
        assert!(draft.remote_or_default());
        assert!(draft.name.is_empty());

        let posted = CreateProject::new("Cleanup Drive", 7);
        assert_eq!(posted.status_or_default(), ProjectStatus::Active);
    }

    #[test]
    fn test_filter_keyword_is_case_insensitive() {
        let p = project("Beach Cleanup", Some("Bring gloves"));
        let filter = ProjectFilter {
            keyword: Some("CLEANUP".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&p, &[]));

        let filter = ProjectFilter {
            keyword: Some("gloves".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&p, &[]));

        let filter = ProjectFilter {
            keyword: Some("tutoring".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&p, &[]));
    }

    #[test]
    fn test_filter_skills_match_any() {
        let p = project("Website", None);
        let filter = ProjectFilter {
            skills: Some(vec![4, 9]),
            ..Default::default()
        };
        assert!(filter.matches(&p, &[1, 9]));
        assert!(!filter.matches(&p, &[1, 2]));
    }

    #[test]
    fn test_filter_job_title_and_remote() {
        let p = project("Website", None);
        let filter = ProjectFilter {
            job_title_id: Some(3),
            remote: Some(true),
            ..Default::default()
        };
        assert!(filter.matches(&p, &[]));

        let filter = ProjectFilter {
            remote: Some(false),
            ..Default::default()
        };
        assert!(!filter.matches(&p, &[]));
    }
}
