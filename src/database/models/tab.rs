use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: Uuid,
    pub page_id: Uuid,
    pub name: String,
    /// Open tag, e.g. "snow_load" or the template type "Welcome"
    pub tab_type: String,
    pub display_order: i32,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(page_id: Uuid, name: impl Into<String>, tab_type: impl Into<String>, display_order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            page_id,
            name: name.into(),
            tab_type: tab_type.into(),
            display_order,
            is_active: false,
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }
}
