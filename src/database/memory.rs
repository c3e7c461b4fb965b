use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Page, Project, Tab, TabData, User};
use crate::database::store::{StoreTx, WorkspaceStore};
use crate::types::{SiblingScope, UserId};

/// In-process store used for development and tests.
///
/// A transaction works on a private copy of the state while holding the
/// store-wide lock, so transactions are fully serialized.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Clone, Default)]
struct MemoryState {
    next_user_id: UserId,
    users: BTreeMap<UserId, User>,
    projects: HashMap<Uuid, Project>,
    pages: HashMap<Uuid, Page>,
    tabs: HashMap<Uuid, Tab>,
    tab_data: HashMap<Uuid, TabData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

fn sorted<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> (i32, chrono::DateTime<Utc>)) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

/// Fails when two siblings under the same parent share a display order
fn ensure_unique_orders<P: Eq + Hash>(
    table: &str,
    rows: impl Iterator<Item = (P, i32)>,
) -> Result<(), DatabaseError> {
    let mut seen = HashSet::new();
    for (parent, order) in rows {
        if !seen.insert((parent, order)) {
            return Err(DatabaseError::Constraint(format!(
                "duplicate display_order {} in {}",
                order, table
            )));
        }
    }
    Ok(())
}

impl MemoryState {
    fn check_constraints(&self) -> Result<(), DatabaseError> {
        ensure_unique_orders("projects", self.projects.values().map(|p| (p.user_id, p.display_order)))?;
        ensure_unique_orders("pages", self.pages.values().map(|p| (p.project_id, p.display_order)))?;
        ensure_unique_orders("tabs", self.tabs.values().map(|t| (t.page_id, t.display_order)))?;
        Ok(())
    }

    // Mirrors ON DELETE CASCADE in schema.sql
    fn remove_page(&mut self, page_id: Uuid) {
        self.pages.remove(&page_id);
        let tabs: Vec<Uuid> = self.tabs.values().filter(|t| t.page_id == page_id).map(|t| t.id).collect();
        for tab_id in tabs {
            self.tabs.remove(&tab_id);
            self.tab_data.remove(&tab_id);
        }
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_scope(&mut self, _scope: SiblingScope) -> Result<(), DatabaseError> {
        // The whole store is already held by this transaction
        Ok(())
    }

    async fn find_user(&mut self, user_id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn insert_user(&mut self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        if self.working.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::Constraint(format!("username '{}' already exists", username)));
        }
        self.working.next_user_id += 1;
        let user = User {
            id: self.working.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    // ==================== PROJECTS ====================

    async fn find_project(&mut self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self.working.projects.get(&id).cloned())
    }

    async fn projects_by_user(&mut self, user_id: UserId) -> Result<Vec<Project>, DatabaseError> {
        Ok(sorted(
            self.working.projects.values().filter(|p| p.user_id == user_id).cloned(),
            |p| (p.display_order, p.created_at),
        ))
    }

    async fn project_name_exists(&mut self, user_id: UserId, name: &str) -> Result<bool, DatabaseError> {
        Ok(self.working.projects.values().any(|p| p.user_id == user_id && p.name == name))
    }

    async fn max_project_order(&mut self, user_id: UserId) -> Result<Option<i32>, DatabaseError> {
        Ok(self
            .working
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.display_order)
            .max())
    }

    async fn save_project(&mut self, project: &Project) -> Result<(), DatabaseError> {
        let clash = self
            .working
            .projects
            .values()
            .any(|p| p.id != project.id && p.user_id == project.user_id && p.name == project.name);
        if clash {
            return Err(DatabaseError::Constraint(format!("project name '{}' already exists", project.name)));
        }
        self.working.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn delete_project(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        self.working.projects.remove(&id);
        let pages: Vec<Uuid> = self.working.pages.values().filter(|p| p.project_id == id).map(|p| p.id).collect();
        for page_id in pages {
            self.working.remove_page(page_id);
        }
        Ok(())
    }

    // ==================== PAGES ====================

    async fn find_page(&mut self, id: Uuid) -> Result<Option<Page>, DatabaseError> {
        Ok(self.working.pages.get(&id).cloned())
    }

    async fn pages_by_project(&mut self, project_id: Uuid) -> Result<Vec<Page>, DatabaseError> {
        Ok(sorted(
            self.working.pages.values().filter(|p| p.project_id == project_id).cloned(),
            |p| (p.display_order, p.created_at),
        ))
    }

    async fn page_name_exists(&mut self, project_id: Uuid, name: &str) -> Result<bool, DatabaseError> {
        Ok(self.working.pages.values().any(|p| p.project_id == project_id && p.name == name))
    }

    async fn max_page_order(&mut self, project_id: Uuid) -> Result<Option<i32>, DatabaseError> {
        Ok(self
            .working
            .pages
            .values()
            .filter(|p| p.project_id == project_id)
            .map(|p| p.display_order)
            .max())
    }

    async fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError> {
        let clash = self
            .working
            .pages
            .values()
            .any(|p| p.id != page.id && p.project_id == page.project_id && p.name == page.name);
        if clash {
            return Err(DatabaseError::Constraint(format!("page name '{}' already exists", page.name)));
        }
        self.working.pages.insert(page.id, page.clone());
        Ok(())
    }

    async fn delete_page(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        self.working.remove_page(id);
        Ok(())
    }

    // ==================== TABS ====================

    async fn find_tab(&mut self, id: Uuid) -> Result<Option<Tab>, DatabaseError> {
        Ok(self.working.tabs.get(&id).cloned())
    }

    async fn tabs_by_page(&mut self, page_id: Uuid) -> Result<Vec<Tab>, DatabaseError> {
        Ok(sorted(
            self.working.tabs.values().filter(|t| t.page_id == page_id).cloned(),
            |t| (t.display_order, t.created_at),
        ))
    }

    async fn tab_name_exists(&mut self, page_id: Uuid, name: &str) -> Result<bool, DatabaseError> {
        Ok(self.working.tabs.values().any(|t| t.page_id == page_id && t.name == name))
    }

    async fn max_tab_order(&mut self, page_id: Uuid) -> Result<Option<i32>, DatabaseError> {
        Ok(self
            .working
            .tabs
            .values()
            .filter(|t| t.page_id == page_id)
            .map(|t| t.display_order)
            .max())
    }

    async fn save_tab(&mut self, tab: &Tab) -> Result<(), DatabaseError> {
        let clash = self
            .working
            .tabs
            .values()
            .any(|t| t.id != tab.id && t.page_id == tab.page_id && t.name == tab.name);
        if clash {
            return Err(DatabaseError::Constraint(format!("tab name '{}' already exists", tab.name)));
        }
        self.working.tabs.insert(tab.id, tab.clone());
        Ok(())
    }

    async fn delete_tab(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        self.working.tabs.remove(&id);
        self.working.tab_data.remove(&id);
        Ok(())
    }

    // ==================== TAB DATA ====================

    async fn find_tab_data(&mut self, tab_id: Uuid) -> Result<Option<TabData>, DatabaseError> {
        Ok(self.working.tab_data.get(&tab_id).cloned())
    }

    async fn save_tab_data(&mut self, data: &TabData) -> Result<(), DatabaseError> {
        if data.encrypted_data.is_some() && data.data.is_some() {
            return Err(DatabaseError::Constraint("tab data holds both ciphertext and plaintext".to_string()));
        }
        self.working.tab_data.insert(data.tab_id, data.clone());
        Ok(())
    }

    async fn delete_tab_data(&mut self, tab_id: Uuid) -> Result<(), DatabaseError> {
        self.working.tab_data.remove(&tab_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryTx { mut guard, working } = *self;
        working.check_constraints()?;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let store = MemoryStore::new();
        let user_id = {
            let mut tx = store.begin().await.unwrap();
            let user = tx.insert_user("ada", "hash").await.unwrap();
            tx.commit().await.unwrap();
            user.id
        };

        {
            let mut tx = store.begin().await.unwrap();
            tx.save_project(&Project::new(user_id, "Survey", 0)).await.unwrap();
            // dropped without commit
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.projects_by_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_rejects_duplicate_orders() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.save_project(&Project::new(1, "A", 0)).await.unwrap();
        tx.save_project(&Project::new(1, "B", 0)).await.unwrap();

        let err = tx.commit().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)));
    }

    #[tokio::test]
    async fn deleting_a_project_cascades() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let project = Project::new(1, "Survey", 0);
        let page = Page::new(project.id, "Roof", 0);
        let tab = Tab::new(page.id, "Loads", "snow_load", 0);
        tx.save_project(&project).await.unwrap();
        tx.save_page(&page).await.unwrap();
        tx.save_tab(&tab).await.unwrap();
        tx.save_tab_data(&TabData::empty(tab.id, "salt".to_string())).await.unwrap();

        tx.delete_project(project.id).await.unwrap();

        assert!(tx.find_page(page.id).await.unwrap().is_none());
        assert!(tx.find_tab(tab.id).await.unwrap().is_none());
        assert!(tx.find_tab_data(tab.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_are_ordered_by_display_order() {
        let store = MemoryStore::new();
        let page_id = Uuid::new_v4();
        let mut tx = store.begin().await.unwrap();
        tx.save_tab(&Tab::new(page_id, "C", "snow_load", 2)).await.unwrap();
        tx.save_tab(&Tab::new(page_id, "A", "snow_load", 0)).await.unwrap();
        tx.save_tab(&Tab::new(page_id, "B", "snow_load", 1)).await.unwrap();

        let names: Vec<String> = tx.tabs_by_page(page_id).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(tx.max_tab_order(page_id).await.unwrap(), Some(2));
    }
}
