//! Password-derived encryption of tab payloads.
//!
//! Keys are derived per record from the user's password, the record's salt and
//! the application secret ([`kdf`]); payloads are sealed with AES-256-GCM
//! ([`cipher`]). Nothing here touches the store.

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod password;

pub use cipher::PayloadCipher;
pub use error::CipherError;
pub use kdf::derive_key;
pub use password::{BcryptPasswordMatcher, PasswordMatcher};
