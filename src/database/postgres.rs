use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Page, Project, Tab, TabData, User};
use crate::database::store::{StoreTx, WorkspaceStore};
use crate::types::{SiblingScope, UserId};

const PROJECT_COLUMNS: &str =
    "id, user_id, name, display_order, is_expanded, is_active, created_at, updated_at";
const PAGE_COLUMNS: &str = "id, project_id, name, display_order, is_active, created_at, updated_at";
const TAB_COLUMNS: &str =
    "id, page_id, name, tab_type, display_order, is_active, is_locked, created_at, updated_at";
const TAB_DATA_COLUMNS: &str =
    "tab_id, encrypted_data, data_salt, is_encrypted, data, created_at, updated_at";

/// Postgres-backed store. Sibling-set locks are transaction-scoped advisory locks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

/// Surface unique violations as constraint errors, everything else as-is
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Constraint(db_err.message().to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_scope(&mut self, scope: SiblingScope) -> Result<(), DatabaseError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(scope.lock_key())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_user(&mut self, user_id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(user)
    }

    async fn insert_user(&mut self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_error)
    }

    // ==================== PROJECTS ====================

    async fn find_project(&mut self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(project)
    }

    async fn projects_by_user(&mut self, user_id: UserId) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY display_order ASC, created_at ASC",
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(projects)
    }

    async fn project_name_exists(&mut self, user_id: UserId, name: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE user_id = $1 AND name = $2)",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn max_project_order(&mut self, user_id: UserId) -> Result<Option<i32>, DatabaseError> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(display_order) FROM projects WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(max)
    }

    async fn save_project(&mut self, project: &Project) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO projects (id, user_id, name, display_order, is_expanded, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                 user_id = EXCLUDED.user_id,
                 name = EXCLUDED.name,
                 display_order = EXCLUDED.display_order,
                 is_expanded = EXCLUDED.is_expanded,
                 is_active = EXCLUDED.is_active,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(project.id)
        .bind(project.user_id)
        .bind(&project.name)
        .bind(project.display_order)
        .bind(project.is_expanded)
        .bind(project.is_active)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete_project(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    // ==================== PAGES ====================

    async fn find_page(&mut self, id: Uuid) -> Result<Option<Page>, DatabaseError> {
        let sql = format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS);
        let page = sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(page)
    }

    async fn pages_by_project(&mut self, project_id: Uuid) -> Result<Vec<Page>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM pages WHERE project_id = $1 ORDER BY display_order ASC, created_at ASC",
            PAGE_COLUMNS
        );
        let pages = sqlx::query_as::<_, Page>(&sql)
            .bind(project_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(pages)
    }

    async fn page_name_exists(&mut self, project_id: Uuid, name: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pages WHERE project_id = $1 AND name = $2)",
        )
        .bind(project_id)
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn max_page_order(&mut self, project_id: Uuid) -> Result<Option<i32>, DatabaseError> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(display_order) FROM pages WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(max)
    }

    async fn save_page(&mut self, page: &Page) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO pages (id, project_id, name, display_order, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                 project_id = EXCLUDED.project_id,
                 name = EXCLUDED.name,
                 display_order = EXCLUDED.display_order,
                 is_active = EXCLUDED.is_active,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(page.id)
        .bind(page.project_id)
        .bind(&page.name)
        .bind(page.display_order)
        .bind(page.is_active)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete_page(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    // ==================== TABS ====================

    async fn find_tab(&mut self, id: Uuid) -> Result<Option<Tab>, DatabaseError> {
        let sql = format!("SELECT {} FROM tabs WHERE id = $1", TAB_COLUMNS);
        let tab = sqlx::query_as::<_, Tab>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(tab)
    }

    async fn tabs_by_page(&mut self, page_id: Uuid) -> Result<Vec<Tab>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tabs WHERE page_id = $1 ORDER BY display_order ASC, created_at ASC",
            TAB_COLUMNS
        );
        let tabs = sqlx::query_as::<_, Tab>(&sql)
            .bind(page_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(tabs)
    }

    async fn tab_name_exists(&mut self, page_id: Uuid, name: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tabs WHERE page_id = $1 AND name = $2)",
        )
        .bind(page_id)
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn max_tab_order(&mut self, page_id: Uuid) -> Result<Option<i32>, DatabaseError> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(display_order) FROM tabs WHERE page_id = $1",
        )
        .bind(page_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(max)
    }

    async fn save_tab(&mut self, tab: &Tab) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO tabs (id, page_id, name, tab_type, display_order, is_active, is_locked, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 tab_type = EXCLUDED.tab_type,
                 display_order = EXCLUDED.display_order,
                 is_active = EXCLUDED.is_active,
                 is_locked = EXCLUDED.is_locked,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(tab.id)
        .bind(tab.page_id)
        .bind(&tab.name)
        .bind(&tab.tab_type)
        .bind(tab.display_order)
        .bind(tab.is_active)
        .bind(tab.is_locked)
        .bind(tab.created_at)
        .bind(tab.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete_tab(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM tabs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    // ==================== TAB DATA ====================

    async fn find_tab_data(&mut self, tab_id: Uuid) -> Result<Option<TabData>, DatabaseError> {
        let sql = format!("SELECT {} FROM tab_data WHERE tab_id = $1", TAB_DATA_COLUMNS);
        let data = sqlx::query_as::<_, TabData>(&sql)
            .bind(tab_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(data)
    }

    async fn save_tab_data(&mut self, data: &TabData) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO tab_data (tab_id, encrypted_data, data_salt, is_encrypted, data, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (tab_id) DO UPDATE SET
                 encrypted_data = EXCLUDED.encrypted_data,
                 data_salt = EXCLUDED.data_salt,
                 is_encrypted = EXCLUDED.is_encrypted,
                 data = EXCLUDED.data,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(data.tab_id)
        .bind(&data.encrypted_data)
        .bind(&data.data_salt)
        .bind(data.is_encrypted)
        .bind(&data.data)
        .bind(data.created_at)
        .bind(data.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete_tab_data(&mut self, tab_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM tab_data WHERE tab_id = $1")
            .bind(tab_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        // Deferred order constraints are checked here
        self.tx.commit().await.map_err(map_write_error)
    }
}
