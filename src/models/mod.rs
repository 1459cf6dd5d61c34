pub mod organization;
pub mod page;
pub mod project;
pub mod skill;
pub mod user;
pub mod user_project;

pub use organization::*;
pub use page::*;
pub use project::*;
pub use skill::*;
pub use user::*;
pub use user_project::*;
