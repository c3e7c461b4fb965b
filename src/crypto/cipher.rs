use aes_gcm::aead::{rand_core::RngCore, Aead, OsRng};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde_json::Value;
use std::sync::Arc;

use crate::crypto::error::CipherError;
use crate::crypto::kdf::derive_key;
use crate::types::JsonMap;

/// GCM nonce length in bytes (96 bits)
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes (128 bits)
pub const TAG_LEN: usize = 16;
/// Per-record salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// AES-256-GCM sealing of JSON payloads under password-derived keys.
///
/// Blob layout: `base64(nonce || ciphertext || tag)`. A fresh nonce is drawn
/// from the OS CSPRNG on every call to [`PayloadCipher::encrypt`].
#[derive(Clone)]
pub struct PayloadCipher {
    app_secret: Arc<str>,
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher").finish_non_exhaustive()
    }
}

impl PayloadCipher {
    pub fn new(app_secret: impl Into<Arc<str>>) -> Self {
        Self { app_secret: app_secret.into() }
    }

    /// Encrypt `data`. An empty map yields `None`: callers store no blob at all.
    pub fn encrypt(&self, data: &JsonMap, password: &str, salt: &str) -> Result<Option<String>, CipherError> {
        if data.is_empty() {
            return Ok(None);
        }

        // serde_json::Map keeps keys sorted, so this is the canonical form
        let plaintext = serde_json::to_vec(data)?;

        let key = derive_key(password, salt, &self.app_secret);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let mut iv = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut iv);
        let nonce = Nonce::from_slice(&iv);

        let sealed = cipher
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|_| CipherError::Encryption("AES-GCM seal failed".to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + sealed.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&sealed);

        Ok(Some(B64.encode(combined)))
    }

    /// Decrypt a blob produced by [`PayloadCipher::encrypt`].
    ///
    /// Wrong password, wrong salt and tampered bytes all surface as
    /// [`CipherError::AuthenticationFailure`]. Text that no longer decodes as
    /// canonical base64 is rejected earlier as [`CipherError::Format`].
    /// Floats come back bit-identical (serde_json `float_roundtrip`).
    pub fn decrypt(&self, blob: &str, password: &str, salt: &str) -> Result<JsonMap, CipherError> {
        let combined = B64
            .decode(blob.trim())
            .map_err(|e| CipherError::Format(format!("invalid base64: {}", e)))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Format(format!(
                "blob is {} bytes, shorter than nonce and tag",
                combined.len()
            )));
        }

        let (iv, sealed) = combined.split_at(NONCE_LEN);
        let key = derive_key(password, salt, &self.app_secret);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), sealed)
            .map_err(|_| CipherError::AuthenticationFailure)?;

        match serde_json::from_slice::<Value>(&plaintext) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CipherError::Format("decrypted payload is not a JSON object".to_string())),
            Err(e) => Err(CipherError::Format(format!("decrypted payload is not JSON: {}", e))),
        }
    }

    /// Fresh random salt for a new tab data record, base64-encoded
    pub fn generate_salt() -> String {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        B64.encode(salt)
    }
}
