use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::crypto::{BcryptPasswordMatcher, PasswordMatcher, PayloadCipher};
use crate::database::models::{Page, Project, Tab, User};
use crate::database::{StoreTx, WorkspaceStore};
use crate::hierarchy::Ordered;
use crate::services::error::WorkspaceError;
use crate::types::{EntityKind, UserId};

/// Entry point for every operation on a user's workspace tree.
///
/// Each public method runs in its own store transaction and takes the
/// sibling-set locks it needs before reading the rows it will change.
/// Cloning is cheap; all state lives behind the store.
#[derive(Clone)]
pub struct WorkspaceService {
    pub(crate) store: Arc<dyn WorkspaceStore>,
    pub(crate) cipher: PayloadCipher,
    pub(crate) passwords: Arc<dyn PasswordMatcher>,
    template_types: Arc<[String]>,
}

impl WorkspaceService {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        cipher: PayloadCipher,
        passwords: Arc<dyn PasswordMatcher>,
        template_types: Vec<String>,
    ) -> Self {
        Self {
            store,
            cipher,
            passwords,
            template_types: template_types.into(),
        }
    }

    /// Service with the configured app secret and the built-in password hash format
    pub fn from_config(store: Arc<dyn WorkspaceStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            PayloadCipher::new(config.encryption.app_secret.as_str()),
            Arc::new(BcryptPasswordMatcher),
            config.encryption.template_tab_types.clone(),
        )
    }

    /// Template tabs render fixed content and never own a payload
    pub fn is_template_type(&self, tab_type: &str) -> bool {
        self.template_types.iter().any(|t| t == tab_type)
    }

    pub async fn health_check(&self) -> Result<(), WorkspaceError> {
        self.store.health_check().await?;
        Ok(())
    }

    /// Register a user with an already hashed password
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, WorkspaceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(WorkspaceError::Validation("username must not be empty".to_string()));
        }
        let mut tx = self.store.begin().await?;
        let user = tx.insert_user(username, password_hash).await?;
        tx.commit().await?;
        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Check `password` against the user's stored hash
    pub async fn validate_user_password(&self, user_id: UserId, password: &str) -> Result<bool, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        match self.verify_password(tx.as_mut(), user_id, password).await {
            Ok(()) => Ok(true),
            Err(WorkspaceError::InvalidPassword) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn verify_password(
        &self,
        tx: &mut dyn StoreTx,
        user_id: UserId,
        password: &str,
    ) -> Result<(), WorkspaceError> {
        if password.is_empty() {
            return Err(WorkspaceError::InvalidPassword);
        }
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| WorkspaceError::not_found(EntityKind::User, user_id))?;
        if !self.passwords.matches(password, &user.password_hash) {
            warn!("Password verification failed for user {}", user_id);
            return Err(WorkspaceError::InvalidPassword);
        }
        Ok(())
    }
}

pub(crate) fn require_name(kind: EntityKind, name: &str) -> Result<String, WorkspaceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceError::Validation(format!("{} name must not be empty", kind)));
    }
    Ok(trimmed.to_string())
}

/// Index of `id` within a freshly locked sibling set
pub(crate) fn position_of<T: Ordered>(siblings: &[T], kind: EntityKind, id: Uuid) -> Result<usize, WorkspaceError> {
    siblings
        .iter()
        .position(|s| s.id() == id)
        .ok_or_else(|| WorkspaceError::not_found(kind, id))
}

pub(crate) async fn owned_project(
    tx: &mut dyn StoreTx,
    user_id: UserId,
    project_id: Uuid,
) -> Result<Project, WorkspaceError> {
    let project = tx
        .find_project(project_id)
        .await?
        .ok_or_else(|| WorkspaceError::not_found(EntityKind::Project, project_id))?;
    if project.user_id != user_id {
        warn!("User {} attempted to access project {} owned by another user", user_id, project_id);
        return Err(WorkspaceError::unauthorized(EntityKind::Project, project_id));
    }
    Ok(project)
}

pub(crate) async fn owned_page(tx: &mut dyn StoreTx, user_id: UserId, page_id: Uuid) -> Result<Page, WorkspaceError> {
    let page = tx
        .find_page(page_id)
        .await?
        .ok_or_else(|| WorkspaceError::not_found(EntityKind::Page, page_id))?;
    owned_project(tx, user_id, page.project_id)
        .await
        .map_err(|e| match e {
            WorkspaceError::Unauthorized(_) => WorkspaceError::unauthorized(EntityKind::Page, page_id),
            other => other,
        })?;
    Ok(page)
}

pub(crate) async fn owned_tab(tx: &mut dyn StoreTx, user_id: UserId, tab_id: Uuid) -> Result<Tab, WorkspaceError> {
    let tab = tx
        .find_tab(tab_id)
        .await?
        .ok_or_else(|| WorkspaceError::not_found(EntityKind::Tab, tab_id))?;
    owned_page(tx, user_id, tab.page_id)
        .await
        .map_err(|e| match e {
            WorkspaceError::Unauthorized(_) => WorkspaceError::unauthorized(EntityKind::Tab, tab_id),
            other => other,
        })?;
    Ok(tab)
}
