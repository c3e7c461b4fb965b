use thiserror::Error;
use uuid::Uuid;

use crate::crypto::CipherError;
use crate::database::DatabaseError;
use crate::hierarchy::OrderError;
use crate::types::EntityKind;

/// Failures of workspace operations.
///
/// Every variant except `Database` and `Internal` is a business failure
/// detected before anything was written.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{kind} {id} does not belong to the addressed parent")]
    NotOwner { kind: EntityKind, id: Uuid },

    #[error("{kind} named '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Invalid password")]
    InvalidPassword,

    /// Wrong password, wrong salt and corrupted blobs are indistinguishable
    #[error("Decryption failed")]
    AuthenticationFailure,

    #[error("Malformed payload: {0}")]
    FormatError(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkspaceError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        WorkspaceError::NotFound { kind, id: id.to_string() }
    }

    pub fn unauthorized(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        WorkspaceError::Unauthorized(format!("{} {} is not owned by the current user", kind, id))
    }

    pub fn duplicate_name(kind: EntityKind, name: impl Into<String>) -> Self {
        WorkspaceError::DuplicateName { kind, name: name.into() }
    }
}

impl From<CipherError> for WorkspaceError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::AuthenticationFailure => WorkspaceError::AuthenticationFailure,
            CipherError::Format(msg) => WorkspaceError::FormatError(msg),
            CipherError::Encryption(msg) => WorkspaceError::Internal(msg),
            CipherError::Serialization(e) => WorkspaceError::Internal(e.to_string()),
        }
    }
}

impl From<OrderError> for WorkspaceError {
    fn from(err: OrderError) -> Self {
        WorkspaceError::InvalidOrder(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_errors_keep_their_meaning() {
        assert!(matches!(
            WorkspaceError::from(CipherError::AuthenticationFailure),
            WorkspaceError::AuthenticationFailure
        ));
        assert!(matches!(
            WorkspaceError::from(CipherError::Format("short".into())),
            WorkspaceError::FormatError(_)
        ));
    }

    #[test]
    fn messages_name_the_entity() {
        let err = WorkspaceError::duplicate_name(EntityKind::Project, "Survey");
        assert_eq!(err.to_string(), "Project named 'Survey' already exists");

        let err = WorkspaceError::not_found(EntityKind::Tab, "abc");
        assert_eq!(err.to_string(), "Tab not found: abc");
    }
}
