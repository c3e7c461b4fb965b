use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::crypto::PayloadCipher;
use crate::database::models::{Tab, TabData};
use crate::database::StoreTx;
use crate::merge::deep_merge;
use crate::services::error::WorkspaceError;
use crate::services::workspace_service::{owned_tab, WorkspaceService};
use crate::types::{JsonMap, SiblingScope, UserId};

/// A tab payload opened with the user's password
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedTabData {
    pub tab_id: Uuid,
    pub data: JsonMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceService {
    /// Stored payload record of a tab, created on first access.
    ///
    /// Never decrypts. Template tabs get a transient empty record.
    pub async fn get_tab_data(&self, user_id: UserId, tab_id: Uuid) -> Result<TabData, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        if self.is_template_type(&tab.tab_type) {
            return Ok(TabData::template_placeholder(tab_id));
        }

        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;
        let record = self.load_or_init(tx.as_mut(), &tab).await?;
        tx.commit().await?;
        Ok(record)
    }

    pub async fn get_tab_data_decrypted(
        &self,
        user_id: UserId,
        tab_id: Uuid,
        password: &str,
    ) -> Result<DecryptedTabData, WorkspaceError> {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        self.verify_password(tx.as_mut(), user_id, password).await?;

        if self.is_template_type(&tab.tab_type) {
            let placeholder = TabData::template_placeholder(tab_id);
            return Ok(DecryptedTabData {
                tab_id,
                data: JsonMap::new(),
                created_at: placeholder.created_at,
                updated_at: placeholder.updated_at,
            });
        }

        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;
        let record = self.load_or_init(tx.as_mut(), &tab).await?;
        let data = self.open_record(&record, password)?;
        tx.commit().await?;

        Ok(DecryptedTabData {
            tab_id,
            data,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Encrypt `data` as the tab's whole payload
    pub async fn replace_tab_data(
        &self,
        user_id: UserId,
        tab_id: Uuid,
        data: JsonMap,
        password: &str,
    ) -> Result<TabData, WorkspaceError> {
        self.write_payload(user_id, tab_id, password, |_| Ok(data)).await
    }

    /// Deep-merge `delta` into the current payload and re-encrypt.
    ///
    /// A legacy plaintext payload is merged and stored encrypted.
    pub async fn update_tab_data(
        &self,
        user_id: UserId,
        tab_id: Uuid,
        delta: JsonMap,
        password: &str,
    ) -> Result<TabData, WorkspaceError> {
        self.write_payload(user_id, tab_id, password, |current| Ok(deep_merge(&current, &delta)))
            .await
    }

    async fn write_payload<F>(
        &self,
        user_id: UserId,
        tab_id: Uuid,
        password: &str,
        build: F,
    ) -> Result<TabData, WorkspaceError>
    where
        F: FnOnce(JsonMap) -> Result<JsonMap, WorkspaceError> + Send,
    {
        let mut tx = self.store.begin().await?;
        let tab = owned_tab(tx.as_mut(), user_id, tab_id).await?;
        if self.is_template_type(&tab.tab_type) {
            return Err(WorkspaceError::Validation(format!(
                "tabs of type '{}' do not store data",
                tab.tab_type
            )));
        }
        self.verify_password(tx.as_mut(), user_id, password).await?;

        tx.lock_scope(SiblingScope::Tabs(tab.page_id)).await?;
        let mut record = self.load_or_init(tx.as_mut(), &tab).await?;
        let migrating = !record.is_encrypted && record.data.is_some();
        let current = self.open_record(&record, password)?;
        let next = build(current)?;

        let salt = match record.data_salt.clone() {
            Some(salt) => salt,
            None => {
                let salt = PayloadCipher::generate_salt();
                record.data_salt = Some(salt.clone());
                salt
            }
        };
        record.set_encrypted(self.cipher.encrypt(&next, password, &salt)?);
        tx.save_tab_data(&record).await?;
        tx.commit().await?;

        if migrating {
            info!("Migrated plaintext payload of tab {} to encrypted storage", tab_id);
        }
        info!("Saved encrypted payload for tab {}", tab_id);
        Ok(record)
    }

    async fn load_or_init(&self, tx: &mut dyn StoreTx, tab: &Tab) -> Result<TabData, WorkspaceError> {
        if let Some(record) = tx.find_tab_data(tab.id).await? {
            return Ok(record);
        }
        let record = TabData::empty(tab.id, PayloadCipher::generate_salt());
        tx.save_tab_data(&record).await?;
        info!("Created payload record for tab {}", tab.id);
        Ok(record)
    }

    /// Current plaintext of a record: decrypted blob, legacy plaintext or empty
    pub(crate) fn open_record(&self, record: &TabData, password: &str) -> Result<JsonMap, WorkspaceError> {
        if let Some(blob) = &record.encrypted_data {
            let salt = record
                .data_salt
                .as_deref()
                .ok_or_else(|| WorkspaceError::FormatError("encrypted payload has no salt".to_string()))?;
            return Ok(self.cipher.decrypt(blob, password, salt)?);
        }
        match &record.data {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(Value::Null) | None => Ok(JsonMap::new()),
            Some(_) => Err(WorkspaceError::FormatError("stored payload is not a JSON object".to_string())),
        }
    }
}
