use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::Project;
use crate::database::StoreTx;
use crate::hierarchy;
use crate::services::error::WorkspaceError;
use crate::services::workspace_service::{owned_project, position_of, require_name, WorkspaceService};
use crate::types::{EntityKind, SiblingScope, UserId};

/// Partial update of a project. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub is_expanded: Option<bool>,
}

impl WorkspaceService {
    pub async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.projects_by_user(user_id).await?)
    }

    pub async fn create_project(&self, user_id: UserId, name: &str) -> Result<Project, WorkspaceError> {
        let name = require_name(EntityKind::Project, name)?;
        let mut tx = self.store.begin().await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(WorkspaceError::not_found(EntityKind::User, user_id));
        }

        tx.lock_scope(SiblingScope::Projects(user_id)).await?;
        if tx.project_name_exists(user_id, &name).await? {
            return Err(WorkspaceError::duplicate_name(EntityKind::Project, name));
        }

        let order = hierarchy::append_order(tx.max_project_order(user_id).await?);
        let project = Project::new(user_id, name, order);
        tx.save_project(&project).await?;
        tx.commit().await?;

        info!("Created project {} for user {} at order {}", project.id, user_id, order);
        Ok(project)
    }

    pub async fn update_project(
        &self,
        user_id: UserId,
        project_id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Project, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;
        tx.lock_scope(SiblingScope::Projects(user_id)).await?;
        let mut project = owned_project(tx.as_mut(), user_id, project_id).await?;

        if let Some(name) = update.name {
            let name = require_name(EntityKind::Project, &name)?;
            if name != project.name && tx.project_name_exists(user_id, &name).await? {
                return Err(WorkspaceError::duplicate_name(EntityKind::Project, name));
            }
            project.name = name;
        }
        if let Some(expanded) = update.is_expanded {
            project.is_expanded = expanded;
        }
        project.updated_at = chrono::Utc::now();

        tx.save_project(&project).await?;
        tx.commit().await?;
        info!("Updated project {}", project_id);
        Ok(project)
    }

    /// Delete a project with its pages, tabs and payloads, closing the order gap
    pub async fn delete_project(&self, user_id: UserId, project_id: Uuid) -> Result<(), WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;
        tx.lock_scope(SiblingScope::Projects(user_id)).await?;

        let mut siblings = tx.projects_by_user(user_id).await?;
        let index = position_of(&siblings, EntityKind::Project, project_id)?;
        siblings.remove(index);
        tx.delete_project(project_id).await?;

        let changed = hierarchy::compact(&mut siblings);
        save_projects(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        info!("Deleted project {} for user {} ({} siblings shifted)", project_id, user_id, changed.len());
        Ok(())
    }

    /// Assign display orders from a complete list of the user's project ids
    pub async fn reorder_projects(&self, user_id: UserId, ids: &[Uuid]) -> Result<Vec<Project>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        tx.lock_scope(SiblingScope::Projects(user_id)).await?;
        let mut siblings = tx.projects_by_user(user_id).await?;

        for id in ids {
            if siblings.iter().any(|p| p.id == *id) {
                continue;
            }
            return Err(match tx.find_project(*id).await? {
                Some(_) => WorkspaceError::NotOwner { kind: EntityKind::Project, id: *id },
                None => WorkspaceError::not_found(EntityKind::Project, id),
            });
        }

        let changed = hierarchy::apply_order(&mut siblings, ids)?;
        save_projects(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        siblings.sort_by_key(|p| p.display_order);
        info!("Reordered {} projects for user {}", siblings.len(), user_id);
        Ok(siblings)
    }

    /// Make a project the user's only active project
    pub async fn activate_project(&self, user_id: UserId, project_id: Uuid) -> Result<Project, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;
        tx.lock_scope(SiblingScope::Projects(user_id)).await?;

        let mut siblings = tx.projects_by_user(user_id).await?;
        let index = position_of(&siblings, EntityKind::Project, project_id)?;
        let changed = hierarchy::activate(&mut siblings, project_id);
        save_projects(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        info!("Activated project {} for user {}", project_id, user_id);
        Ok(siblings.swap_remove(index))
    }
}

pub(crate) async fn save_projects(
    tx: &mut dyn StoreTx,
    projects: &[Project],
    indices: &[usize],
) -> Result<(), WorkspaceError> {
    for &index in indices {
        tx.save_project(&projects[index]).await?;
    }
    Ok(())
}
