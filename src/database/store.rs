use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Page, Project, Tab, TabData, User};
use crate::types::{SiblingScope, UserId};

/// Backing store for the workspace tree.
///
/// All reads and writes go through a [`StoreTx`]; nothing is visible to other
/// transactions until [`StoreTx::commit`] succeeds. Dropping a transaction
/// without committing discards every write made through it.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// One unit of work against the store.
///
/// List methods return siblings ordered by `display_order` ascending.
#[async_trait]
pub trait StoreTx: Send {
    /// Serialize with every other transaction holding the same scope until this one ends
    async fn lock_scope(&mut self, scope: SiblingScope) -> Result<(), DatabaseError>;

    // Users
    async fn find_user(&mut self, user_id: UserId) -> Result<Option<User>, DatabaseError>;
    async fn insert_user(&mut self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    // Projects
    async fn find_project(&mut self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn projects_by_user(&mut self, user_id: UserId) -> Result<Vec<Project>, DatabaseError>;
    async fn project_name_exists(&mut self, user_id: UserId, name: &str) -> Result<bool, DatabaseError>;
    async fn max_project_order(&mut self, user_id: UserId) -> Result<Option<i32>, DatabaseError>;
    async fn save_project(&mut self, project: &Project) -> Result<(), DatabaseError>;
    async fn delete_project(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    // Pages
    async fn find_page(&mut self, id: Uuid) -> Result<Option<Page>, DatabaseError>;
    async fn pages_by_project(&mut self, project_id: Uuid) -> Result<Vec<Page>, DatabaseError>;
    async fn page_name_exists(&mut self, project_id: Uuid, name: &str) -> Result<bool, DatabaseError>;
    async fn max_page_order(&mut self, project_id: Uuid) -> Result<Option<i32>, DatabaseError>;
    async fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError>;
    async fn delete_page(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    // Tabs
    async fn find_tab(&mut self, id: Uuid) -> Result<Option<Tab>, DatabaseError>;
    async fn tabs_by_page(&mut self, page_id: Uuid) -> Result<Vec<Tab>, DatabaseError>;
    async fn tab_name_exists(&mut self, page_id: Uuid, name: &str) -> Result<bool, DatabaseError>;
    async fn max_tab_order(&mut self, page_id: Uuid) -> Result<Option<i32>, DatabaseError>;
    async fn save_tab(&mut self, tab: &Tab) -> Result<(), DatabaseError>;
    async fn delete_tab(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    // Tab payloads
    async fn find_tab_data(&mut self, tab_id: Uuid) -> Result<Option<TabData>, DatabaseError>;
    async fn save_tab_data(&mut self, data: &TabData) -> Result<(), DatabaseError>;
    async fn delete_tab_data(&mut self, tab_id: Uuid) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}
