pub mod job_title;
pub mod organization;
pub mod project;
pub mod project_skill;
pub mod skill;
pub mod user;
pub mod user_project;
pub mod user_skill;
