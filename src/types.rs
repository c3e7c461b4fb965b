/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque JSON object stored in a tab payload
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Users are keyed by the identity provider's numeric id
pub type UserId = i64;

/// Entity kinds of the workspace tree, used in error messages and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Project,
    Page,
    Tab,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "User",
            EntityKind::Project => "Project",
            EntityKind::Page => "Page",
            EntityKind::Tab => "Tab",
        };
        f.write_str(name)
    }
}

/// A sibling set: every entity sharing one parent.
///
/// Mutations lock the scopes they touch; when more than one scope is needed
/// they are locked in `Ord` order so two requests never wait on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SiblingScope {
    Projects(UserId),
    Pages(Uuid),
    Tabs(Uuid),
}

impl SiblingScope {
    /// Stable key used for advisory locking in the backing store
    pub fn lock_key(&self) -> String {
        match self {
            SiblingScope::Projects(user_id) => format!("projects:{}", user_id),
            SiblingScope::Pages(project_id) => format!("pages:{}", project_id),
            SiblingScope::Tabs(page_id) => format!("tabs:{}", page_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_sort_projects_before_pages_before_tabs() {
        let page = Uuid::new_v4();
        let mut scopes = vec![
            SiblingScope::Tabs(page),
            SiblingScope::Projects(7),
            SiblingScope::Pages(page),
        ];
        scopes.sort();
        assert_eq!(scopes[0], SiblingScope::Projects(7));
        assert_eq!(scopes[1], SiblingScope::Pages(page));
        assert_eq!(scopes[2], SiblingScope::Tabs(page));
    }

    #[test]
    fn lock_keys_are_distinct_per_level() {
        let id = Uuid::new_v4();
        assert_ne!(SiblingScope::Pages(id).lock_key(), SiblingScope::Tabs(id).lock_key());
        assert_eq!(SiblingScope::Projects(42).lock_key(), "projects:42");
    }
}
