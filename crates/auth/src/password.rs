use sha2::{Digest, Sha256};

/// Encode a password as `salt$hex(sha256(salt || password))`.
///
/// The salt is random per user. Verification re-derives the digest from the
/// stored salt, so the encoding is self-contained in one column.
pub fn hash_password(password: &str) -> String {
    let salt = nanoid::nanoid!(16);
    format!("{salt}${}", digest_with_salt(&salt, password))
}

/// Verify a password against a stored `salt$digest` encoding.
///
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    digest_with_salt(salt, password) == digest
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("secret"), hash_password("secret"));
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        assert!(!verify_password("anything", "no-dollar-sign"));
        assert!(!verify_password("anything", ""));
    }
}
