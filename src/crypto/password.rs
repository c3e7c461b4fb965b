/// Checks a candidate password against a user's stored hash.
///
/// Credential storage belongs to the identity layer; the workspace core only
/// asks this question before any payload is encrypted or decrypted.
pub trait PasswordMatcher: Send + Sync {
    fn matches(&self, candidate: &str, stored_hash: &str) -> bool;
}

/// BCrypt hashes (`$2a$`, `$2b$`, `$2x$`, `$2y$`) as written by the identity layer
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptPasswordMatcher;

impl BcryptPasswordMatcher {
    /// Hash a password at the library's default cost
    pub fn hash(password: &str) -> Result<String, bcrypt::BcryptError> {
        Self::hash_with_cost(password, bcrypt::DEFAULT_COST)
    }

    /// Hash at an explicit cost (4..=31); low costs are only meant for tests and seeding
    pub fn hash_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(password, cost)
    }
}

impl PasswordMatcher for BcryptPasswordMatcher {
    fn matches(&self, candidate: &str, stored_hash: &str) -> bool {
        match bcrypt::verify(candidate, stored_hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Stored password hash is not a usable bcrypt hash: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_match() {
        let stored = BcryptPasswordMatcher::hash_with_cost("correct horse", 4).unwrap();
        assert!(stored.starts_with("$2"));
        assert!(BcryptPasswordMatcher.matches("correct horse", &stored));
        assert!(!BcryptPasswordMatcher.matches("correct horse!", &stored));
    }

    #[test]
    fn verifies_existing_2a_hashes() {
        // Published bcrypt vector for "U*U" at cost 5
        let stored = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        assert!(BcryptPasswordMatcher.matches("U*U", stored));
        assert!(!BcryptPasswordMatcher.matches("U*U*", stored));

        let generated = bcrypt::hash_with_result("hunter2", 4)
            .unwrap()
            .format_for_version(bcrypt::Version::TwoA);
        assert!(generated.starts_with("$2a$04$"));
        assert!(BcryptPasswordMatcher.matches("hunter2", &generated));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(
            BcryptPasswordMatcher::hash_with_cost("pw", 4).unwrap(),
            BcryptPasswordMatcher::hash_with_cost("pw", 4).unwrap()
        );
    }

    #[test]
    fn unknown_formats_never_match() {
        assert!(!BcryptPasswordMatcher.matches("pw", "pw"));
        assert!(!BcryptPasswordMatcher.matches("pw", "sha256$x$y"));
        assert!(!BcryptPasswordMatcher.matches("pw", ""));
    }
}
