//! Password Service
//!
//! Argon2id hashing and the password policy applied at registration.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::error::{PlatformError, Result};

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_letter: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_digit: true,
            require_letter: true,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_length {
            return Err(PlatformError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PlatformError::validation("Password must contain a digit"));
        }
        if self.require_letter && !password.chars().any(char::is_alphabetic) {
            return Err(PlatformError::validation("Password must contain a letter"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct PasswordService {
    policy: PasswordPolicy,
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            policy,
            argon2: Argon2::default(),
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PlatformError::internal(format!("Failed to encode salt: {}", e)))?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PlatformError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Validate against the policy, then hash.
    pub fn hash_new_password(&self, password: &str) -> Result<String> {
        self.policy.validate(password)?;
        self.hash_password(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::internal(format!("Stored password hash is malformed: {}", e)))?;
        Ok(self.argon2.verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::default();
        let hash = service.hash_password("Gallop123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(service.verify_password("Gallop123", &hash).unwrap());
        assert!(!service.verify_password("gallop123", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = PasswordService::default();
        let a = service.hash_password("Gallop123").unwrap();
        let b = service.hash_password("Gallop123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_policy() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("short1").is_err());
        assert!(policy.validate("nodigitshere").is_err());
        assert!(policy.validate("1234567890").is_err());
        assert!(policy.validate("Canter2024").is_ok());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let service = PasswordService::default();
        assert!(service.verify_password("x", "not-a-hash").is_err());
    }
}
