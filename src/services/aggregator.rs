use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Page, Project, Tab};
use crate::hierarchy;
use crate::services::error::WorkspaceError;
use crate::services::projects::save_projects;
use crate::services::pages::save_pages;
use crate::services::workspace_service::WorkspaceService;
use crate::types::{SiblingScope, UserId};

/// A user's whole workspace, every level ordered by display order
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceTree {
    pub projects: Vec<ProjectNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectNode {
    #[serde(flatten)]
    pub project: Project,
    pub pages: Vec<PageNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageNode {
    #[serde(flatten)]
    pub page: Page,
    pub tabs: Vec<Tab>,
}

/// Ids along the active chain; a level is absent when nothing is active there
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_project_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_page_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tab_id: Option<Uuid>,
}

impl WorkspaceService {
    /// Project → page → tab tree for a user. Payloads are never read.
    pub async fn get_all_workspace_data(&self, user_id: UserId) -> Result<WorkspaceTree, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let mut projects = Vec::new();
        for project in tx.projects_by_user(user_id).await? {
            let mut pages = Vec::new();
            for page in tx.pages_by_project(project.id).await? {
                let tabs = tx.tabs_by_page(page.id).await?;
                pages.push(PageNode { page, tabs });
            }
            projects.push(ProjectNode { project, pages });
        }
        Ok(WorkspaceTree { projects })
    }

    pub async fn get_last_active_state(&self, user_id: UserId) -> Result<ActiveState, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let mut state = ActiveState::default();

        let projects = tx.projects_by_user(user_id).await?;
        let Some(project) = projects.iter().find(|p| p.is_active) else {
            return Ok(state);
        };
        state.active_project_id = Some(project.id);

        let pages = tx.pages_by_project(project.id).await?;
        let Some(page) = pages.iter().find(|p| p.is_active) else {
            return Ok(state);
        };
        state.active_page_id = Some(page.id);

        // Lists are ordered, so a stray second active tab never wins
        let tabs = tx.tabs_by_page(page.id).await?;
        state.active_tab_id = tabs.iter().find(|t| t.is_active).map(|t| t.id);
        Ok(state)
    }

    /// Activate the first project and its first page unless the first project is already active
    pub async fn set_default_active_state(&self, user_id: UserId) -> Result<ActiveState, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        tx.lock_scope(SiblingScope::Projects(user_id)).await?;

        let mut projects = tx.projects_by_user(user_id).await?;
        let Some(first) = projects.first().cloned() else {
            return Ok(ActiveState::default());
        };
        if first.is_active {
            drop(tx);
            return self.get_last_active_state(user_id).await;
        }

        let changed = hierarchy::activate(&mut projects, first.id);
        save_projects(tx.as_mut(), &projects, &changed).await?;

        tx.lock_scope(SiblingScope::Pages(first.id)).await?;
        let mut pages = tx.pages_by_project(first.id).await?;
        let first_page = pages.first().map(|p| p.id);
        if let Some(page_id) = first_page {
            let changed = hierarchy::activate(&mut pages, page_id);
            save_pages(tx.as_mut(), &pages, &changed).await?;
        }
        tx.commit().await?;

        info!("Set default active state for user {}", user_id);
        self.get_last_active_state(user_id).await
    }
}
