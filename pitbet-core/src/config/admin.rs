//! Admin API credentials.

use argon2::{Argon2, PasswordHash, PasswordVerifier};

/// Holds the argon2 hash of the admin secret. The plaintext never stays in
/// memory after the config is loaded.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    secret_hash: String,
}

impl AdminConfig {
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Check a presented secret against the stored hash. A malformed hash
    /// rejects everything.
    pub fn verify_secret(&self, presented: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.secret_hash) else {
            tracing::error!("Admin secret hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(presented.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;

    fn hashed(secret: &str) -> String {
        let salt = SaltString::from_b64("c29tZXNhbHRmb3J0ZXN0cw").unwrap();
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn verifies_the_right_secret_only() {
        let config = AdminConfig::new(hashed("open sesame"));
        assert!(config.verify_secret("open sesame"));
        assert!(!config.verify_secret("open sesame "));
        assert!(!config.verify_secret(""));
    }

    #[test]
    fn malformed_hash_rejects_everything() {
        let config = AdminConfig::new("plaintext".to_string());
        assert!(!config.verify_secret("plaintext"));
    }
}
