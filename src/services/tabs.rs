use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

use crate::crypto::PayloadCipher;
use crate::database::models::{Tab, TabData};
use crate::database::StoreTx;
use crate::hierarchy::{self, Ordered};
use crate::services::error::WorkspaceError;
use crate::services::workspace_service::{owned_page, owned_tab, position_of, require_name, WorkspaceService};
use crate::types::{EntityKind, SiblingScope, UserId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTab {
    pub name: String,
    pub tab_type: String,
    /// Zero-based insertion point; absent, negative or past-the-end appends
    #[serde(default)]
    pub position: Option<i32>,
}

/// Partial update of a tab. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    pub name: Option<String>,
    pub tab_type: Option<String>,
    pub is_active: Option<bool>,
    pub is_locked: Option<bool>,
}

impl WorkspaceService {
    pub async fn list_tabs(&self, user_id: UserId, page_id: Uuid) -> Result<Vec<Tab>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_page(tx.as_mut(), user_id, page_id).await?;
        Ok(tx.tabs_by_page(page_id).await?)
    }

    /// Create a tab at `position` and make it the page's active tab.
    ///
    /// Non-template tabs get an empty payload record with a fresh salt.
    pub async fn create_tab(&self, user_id: UserId, page_id: Uuid, new_tab: NewTab) -> Result<Tab, WorkspaceError> {
        let name = require_name(EntityKind::Tab, &new_tab.name)?;
        let tab_type = require_tab_type(&new_tab.tab_type)?;

        let mut tx = self.store.begin().await?;
        owned_page(tx.as_mut(), user_id, page_id).await?;
        tx.lock_scope(SiblingScope::Tabs(page_id)).await?;

        if tx.tab_name_exists(page_id, &name).await? {
            return Err(WorkspaceError::duplicate_name(EntityKind::Tab, name));
        }

        let mut siblings = tx.tabs_by_page(page_id).await?;
        let placement = hierarchy::insert_at(&mut siblings, new_tab.position);
        let mut changed: BTreeSet<usize> = placement.shifted.into_iter().collect();
        changed.extend(hierarchy::deactivate_all(&mut siblings));
        save_tabs(tx.as_mut(), &siblings, changed.iter().copied()).await?;

        let mut tab = Tab::new(page_id, name, tab_type, placement.order);
        tab.is_active = true;
        tx.save_tab(&tab).await?;

        if !self.is_template_type(&tab.tab_type) {
            tx.save_tab_data(&TabData::empty(tab.id, PayloadCipher::generate_salt())).await?;
        }
        tx.commit().await?;

        info!("Created tab {} ({}) on page {} at order {}", tab.id, tab.tab_type, page_id, tab.display_order);
        Ok(tab)
    }

    /// Rename, retype, (de)activate or (un)lock a tab.
    ///
    /// Changing the type discards the payload: the tab gets a fresh empty
    /// record, or none at all when the new type is a template.
    pub async fn update_tab(&self, user_id: UserId, tab_id: Uuid, update: TabUpdate) -> Result<Tab, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;

        let mut siblings = tx.tabs_by_page(tab.page_id).await?;
        let index = position_of(&siblings, EntityKind::Tab, tab_id)?;
        let mut changed = BTreeSet::from([index]);

        if let Some(name) = update.name {
            let name = require_name(EntityKind::Tab, &name)?;
            if siblings.iter().any(|t| t.id != tab_id && t.name == name) {
                return Err(WorkspaceError::duplicate_name(EntityKind::Tab, name));
            }
            siblings[index].name = name;
        }

        if let Some(tab_type) = update.tab_type {
            let tab_type = require_tab_type(&tab_type)?;
            if tab_type != siblings[index].tab_type {
                self.reset_payload(tx.as_mut(), tab_id, &tab_type).await?;
                info!("Tab {} changed type to {}; payload reset", tab_id, tab_type);
                siblings[index].tab_type = tab_type;
            }
        }

        match update.is_active {
            Some(true) => changed.extend(hierarchy::activate(&mut siblings, tab_id)),
            Some(false) => siblings[index].set_active(false),
            None => {}
        }

        if let Some(locked) = update.is_locked {
            siblings[index].is_locked = locked;
        }
        siblings[index].updated_at = chrono::Utc::now();

        save_tabs(tx.as_mut(), &siblings, changed.iter().copied()).await?;
        tx.commit().await?;

        info!("Updated tab {}", tab_id);
        Ok(siblings.swap_remove(index))
    }

    pub async fn activate_tab(&self, user_id: UserId, tab_id: Uuid) -> Result<Tab, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;

        let mut siblings = tx.tabs_by_page(tab.page_id).await?;
        let index = position_of(&siblings, EntityKind::Tab, tab_id)?;
        let changed = hierarchy::activate(&mut siblings, tab_id);
        save_tabs(tx.as_mut(), &siblings, changed.into_iter()).await?;
        tx.commit().await?;

        info!("Activated tab {} on page {}", tab_id, tab.page_id);
        Ok(siblings.swap_remove(index))
    }

    /// Delete a tab with its payload, closing the order gap
    pub async fn delete_tab(&self, user_id: UserId, tab_id: Uuid) -> Result<(), WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;

        let mut siblings = tx.tabs_by_page(tab.page_id).await?;
        let index = position_of(&siblings, EntityKind::Tab, tab_id)?;
        siblings.remove(index);
        tx.delete_tab(tab_id).await?;

        let changed = hierarchy::compact(&mut siblings);
        save_tabs(tx.as_mut(), &siblings, changed.into_iter()).await?;
        tx.commit().await?;

        info!("Deleted tab {} from page {}", tab_id, tab.page_id);
        Ok(())
    }

    /// Copy a tab to the end of its page under `new_name`, inactive and unlocked.
    ///
    /// The copy's payload is re-encrypted under its own salt, so copying a tab
    /// with content needs the user's password.
    pub async fn duplicate_tab(
        &self,
        user_id: UserId,
        tab_id: Uuid,
        new_name: &str,
        password: Option<&str>,
    ) -> Result<Tab, WorkspaceError> {
        let name = require_name(EntityKind::Tab, new_name)?;
        let mut tx = self.store.begin().await?;
        let source = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        tx.lock_scope(SiblingScope::Tabs(source.page_id)).await?;

        if tx.tab_name_exists(source.page_id, &name).await? {
            return Err(WorkspaceError::duplicate_name(EntityKind::Tab, name));
        }

        let order = hierarchy::append_order(tx.max_tab_order(source.page_id).await?);
        let copy = Tab::new(source.page_id, name, source.tab_type.clone(), order);
        tx.save_tab(&copy).await?;

        if !self.is_template_type(&copy.tab_type) {
            let mut record = TabData::empty(copy.id, PayloadCipher::generate_salt());
            let existing = tx.find_tab_data(tab_id).await?;
            if let Some(existing) = existing.filter(TabData::has_content) {
                let password = password.unwrap_or_default();
                self.verify_password(tx.as_mut(), user_id, password).await?;
                let content = self.open_record(&existing, password)?;
                let salt = record.data_salt.clone().unwrap_or_default();
                record.set_encrypted(self.cipher.encrypt(&content, password, &salt)?);
            }
            tx.save_tab_data(&record).await?;
        }
        tx.commit().await?;

        info!("Duplicated tab {} as {} at order {}", tab_id, copy.id, order);
        Ok(copy)
    }

    /// Assign display orders from a complete list of the page's tab ids
    pub async fn reorder_tabs(&self, user_id: UserId, page_id: Uuid, ids: &[Uuid]) -> Result<Vec<Tab>, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        owned_page(tx.as_mut(), user_id, page_id).await?;
        tx.lock_scope(SiblingScope::Tabs(page_id)).await?;
        let mut siblings = tx.tabs_by_page(page_id).await?;

        for id in ids {
            if siblings.iter().any(|t| t.id == *id) {
                continue;
            }
            return Err(match tx.find_tab(*id).await? {
                Some(_) => WorkspaceError::NotOwner { kind: EntityKind::Tab, id: *id },
                None => WorkspaceError::not_found(EntityKind::Tab, id),
            });
        }

        let changed = hierarchy::apply_order(&mut siblings, ids)?;
        save_tabs(tx.as_mut(), &siblings, changed.into_iter()).await?;
        tx.commit().await?;

        siblings.sort_by_key(|t| t.display_order);
        info!("Reordered {} tabs on page {}", siblings.len(), page_id);
        Ok(siblings)
    }

    /// Drop a tab's payload after a type change, keeping templates record-free
    async fn reset_payload(&self, tx: &mut dyn StoreTx, tab_id: Uuid, new_type: &str) -> Result<(), WorkspaceError> {
        tx.delete_tab_data(tab_id).await?;
        if !self.is_template_type(new_type) {
            tx.save_tab_data(&TabData::empty(tab_id, PayloadCipher::generate_salt())).await?;
        }
        Ok(())
    }
}

fn require_tab_type(tab_type: &str) -> Result<String, WorkspaceError> {
    let trimmed = tab_type.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceError::Validation("tab type must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

async fn save_tabs(
    tx: &mut dyn StoreTx,
    tabs: &[Tab],
    indices: impl Iterator<Item = usize> + Send,
) -> Result<(), WorkspaceError> {
    for index in indices {
        tx.save_tab(&tabs[index]).await?;
    }
    Ok(())
}
