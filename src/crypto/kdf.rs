use sha2::{Digest, Sha256};

/// Length in bytes of a derived payload key (256 bits)
pub const KEY_LEN: usize = 32;

/// Derive the payload key for one record.
///
/// `SHA-256(password || salt || app_secret)`; deterministic and one-way. The salt
/// is used in its stored (base64 text) form. Callers reject empty passwords.
pub fn derive_key(password: &str, salt: &str, app_secret: &str) -> [u8; KEY_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(app_secret.as_bytes());
    let digest = hasher.finalize();

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        assert_eq!(derive_key("pw", "salt", "secret"), derive_key("pw", "salt", "secret"));
    }

    #[test]
    fn every_input_changes_the_key() {
        let base = derive_key("pw", "salt", "secret");
        assert_ne!(base, derive_key("pw2", "salt", "secret"));
        assert_ne!(base, derive_key("pw", "salt2", "secret"));
        assert_ne!(base, derive_key("pw", "salt", "secret2"));
    }

    #[test]
    fn matches_plain_sha256_of_concatenation() {
        let expected = Sha256::digest(b"hunter2c2FsdA==app");
        assert_eq!(&derive_key("hunter2", "c2FsdA==", "app")[..], &expected[..]);
    }
}
