pub mod page;
pub mod project;
pub mod tab;
pub mod tab_data;
pub mod user;

pub use page::Page;
pub use project::Project;
pub use tab::Tab;
pub use tab_data::TabData;
pub use user::User;
