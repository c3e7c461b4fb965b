pub mod aggregator;
pub mod error;
pub mod pages;
pub mod projects;
pub mod tab_data;
pub mod tabs;
pub mod workspace_service;

pub use aggregator::{ActiveState, PageNode, ProjectNode, WorkspaceTree};
pub use error::WorkspaceError;
pub use pages::PageUpdate;
pub use projects::ProjectUpdate;
pub use tab_data::DecryptedTabData;
pub use tabs::{NewTab, TabUpdate};
pub use workspace_service::WorkspaceService;
