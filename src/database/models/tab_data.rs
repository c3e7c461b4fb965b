use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Payload record of a non-template tab.
///
/// `encrypted_data` and the legacy plaintext `data` are never both populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TabData {
    pub tab_id: Uuid,
    /// base64(nonce || ciphertext || tag), `None` until content is first saved
    pub encrypted_data: Option<String>,
    pub data_salt: Option<String>,
    pub is_encrypted: bool,
    /// Plaintext payload left over from records written before encryption
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabData {
    /// Empty encrypted record with its own salt
    pub fn empty(tab_id: Uuid, salt: String) -> Self {
        let now = Utc::now();
        Self {
            tab_id,
            encrypted_data: None,
            data_salt: Some(salt),
            is_encrypted: true,
            data: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transient view returned for template tabs, which store nothing
    pub fn template_placeholder(tab_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            tab_id,
            encrypted_data: None,
            data_salt: None,
            is_encrypted: false,
            data: Some(Value::Object(Default::default())),
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a new ciphertext, dropping any plaintext copy
    pub fn set_encrypted(&mut self, blob: Option<String>) {
        self.encrypted_data = blob;
        self.is_encrypted = true;
        self.data = None;
        self.updated_at = Utc::now();
    }

    pub fn has_content(&self) -> bool {
        let plaintext = match &self.data {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        self.encrypted_data.is_some() || plaintext
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_encrypted_clears_plaintext() {
        let mut record = TabData::empty(Uuid::new_v4(), "c2FsdA==".to_string());
        record.is_encrypted = false;
        record.data = Some(json!({"legacy": true}));

        record.set_encrypted(Some("blob".to_string()));

        assert!(record.is_encrypted);
        assert!(record.data.is_none());
        assert_eq!(record.encrypted_data.as_deref(), Some("blob"));
    }

    #[test]
    fn empty_record_has_no_content() {
        let record = TabData::empty(Uuid::new_v4(), "c2FsdA==".to_string());
        assert!(!record.has_content());
        assert!(!TabData::template_placeholder(Uuid::new_v4()).has_content());
    }
}
