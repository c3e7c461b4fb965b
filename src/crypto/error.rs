use thiserror::Error;

/// Cipher failures. Authentication failures never say which input was wrong.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Decryption failed")]
    AuthenticationFailure,

    #[error("Malformed encrypted payload: {0}")]
    Format(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
