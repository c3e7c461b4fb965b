use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::Page;
use crate::database::StoreTx;
use crate::hierarchy;
use crate::services::error::WorkspaceError;
use crate::services::workspace_service::{owned_page, owned_project, position_of, require_name, WorkspaceService};
use crate::types::{EntityKind, SiblingScope, UserId};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageUpdate {
    pub name: Option<String>,
}

impl WorkspaceService {
    pub async fn list_pages(&self, user_id: UserId, project_id: Uuid) -> Result<Vec<Page>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;
        Ok(tx.pages_by_project(project_id).await?)
    }

    pub async fn create_page(&self, user_id: UserId, project_id: Uuid, name: &str) -> Result<Page, WorkspaceError> {
        let name = require_name(EntityKind::Page, name)?;
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;

        tx.lock_scope(SiblingScope::Pages(project_id)).await?;
        if tx.page_name_exists(project_id, &name).await? {
            return Err(WorkspaceError::duplicate_name(EntityKind::Page, name));
        }

        let order = hierarchy::append_order(tx.max_page_order(project_id).await?);
        let page = Page::new(project_id, name, order);
        tx.save_page(&page).await?;
        tx.commit().await?;

        info!("Created page {} in project {} at order {}", page.id, project_id, order);
        Ok(page)
    }

    pub async fn update_page(&self, user_id: UserId, page_id: Uuid, update: PageUpdate) -> Result<Page, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let page = owned_page(tx.as_mut(), user_id, page_id).await?;
        tx.lock_scope(SiblingScope::Pages(page.project_id)).await?;
        let mut page = owned_page(tx.as_mut(), user_id, page_id).await?;

        if let Some(name) = update.name {
            let name = require_name(EntityKind::Page, &name)?;
            if name != page.name && tx.page_name_exists(page.project_id, &name).await? {
                return Err(WorkspaceError::duplicate_name(EntityKind::Page, name));
            }
            page.name = name;
        }
        page.updated_at = chrono::Utc::now();

        tx.save_page(&page).await?;
        tx.commit().await?;
        info!("Updated page {}", page_id);
        Ok(page)
    }

    pub async fn delete_page(&self, user_id: UserId, page_id: Uuid) -> Result<(), WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let page = owned_page(tx.as_mut(), user_id, page_id).await?;
        tx.lock_scope(SiblingScope::Pages(page.project_id)).await?;

        let mut siblings = tx.pages_by_project(page.project_id).await?;
        let index = position_of(&siblings, EntityKind::Page, page_id)?;
        siblings.remove(index);
        tx.delete_page(page_id).await?;

        let changed = hierarchy::compact(&mut siblings);
        save_pages(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        info!("Deleted page {} from project {}", page_id, page.project_id);
        Ok(())
    }

    pub async fn reorder_pages(
        &self,
        user_id: UserId,
        project_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Page>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_project(tx.as_mut(), user_id, project_id).await?;
        tx.lock_scope(SiblingScope::Pages(project_id)).await?;
        let mut siblings = tx.pages_by_project(project_id).await?;

        for id in ids {
            if siblings.iter().any(|p| p.id == *id) {
                continue;
            }
            return Err(match tx.find_page(*id).await? {
                Some(_) => WorkspaceError::NotOwner { kind: EntityKind::Page, id: *id },
                None => WorkspaceError::not_found(EntityKind::Page, id),
            });
        }

        let changed = hierarchy::apply_order(&mut siblings, ids)?;
        save_pages(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        siblings.sort_by_key(|p| p.display_order);
        info!("Reordered {} pages in project {}", siblings.len(), project_id);
        Ok(siblings)
    }

    /// Move a page to the end of another project owned by the same user.
    ///
    /// The source project is compacted. A moved page arrives inactive.
    pub async fn move_page(&self, user_id: UserId, page_id: Uuid, target_project_id: Uuid) -> Result<Page, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let page = owned_page(tx.as_mut(), user_id, page_id).await?;
        owned_project(tx.as_mut(), user_id, target_project_id).await?;

        let source_project_id = page.project_id;
        if source_project_id == target_project_id {
            return Ok(page);
        }

        let mut scopes = [SiblingScope::Pages(source_project_id), SiblingScope::Pages(target_project_id)];
        scopes.sort();
        for scope in scopes {
            tx.lock_scope(scope).await?;
        }

        let mut source = tx.pages_by_project(source_project_id).await?;
        let index = position_of(&source, EntityKind::Page, page_id)?;
        let mut page = source.remove(index);

        if tx.page_name_exists(target_project_id, &page.name).await? {
            return Err(WorkspaceError::duplicate_name(EntityKind::Page, page.name));
        }

        let order = hierarchy::append_order(tx.max_page_order(target_project_id).await?);
        page.project_id = target_project_id;
        page.display_order = order;
        page.is_active = false;
        page.updated_at = chrono::Utc::now();
        tx.save_page(&page).await?;

        let changed = hierarchy::compact(&mut source);
        save_pages(tx.as_mut(), &source, &changed).await?;
        tx.commit().await?;

        info!(
            "Moved page {} from project {} to project {} at order {}",
            page_id, source_project_id, target_project_id, order
        );
        Ok(page)
    }

    pub async fn activate_page(&self, user_id: UserId, page_id: Uuid) -> Result<Page, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let page = owned_page(tx.as_mut(), user_id, page_id).await?;
        tx.lock_scope(SiblingScope::Pages(page.project_id)).await?;

        let mut siblings = tx.pages_by_project(page.project_id).await?;
        let index = position_of(&siblings, EntityKind::Page, page_id)?;
        let changed = hierarchy::activate(&mut siblings, page_id);
        save_pages(tx.as_mut(), &siblings, &changed).await?;
        tx.commit().await?;

        info!("Activated page {} in project {}", page_id, page.project_id);
        Ok(siblings.swap_remove(index))
    }
}

pub(crate) async fn save_pages(tx: &mut dyn StoreTx, pages: &[Page], indices: &[usize]) -> Result<(), WorkspaceError> {
    for &index in indices {
        tx.save_page(&pages[index]).await?;
    }
    Ok(())
}
