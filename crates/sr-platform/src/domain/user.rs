//! Identity Entities
//!
//! Application users, roles and the refresh tokens issued to them.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Failed password attempts before the account is locked
pub const MAX_FAILED_ACCESS_ATTEMPTS: i32 = 5;

/// How long a lockout lasts
pub const LOCKOUT_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationUser {
    /// UUID string
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_confirmed: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub access_failed_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_name: email.clone(),
            email,
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            email_confirmed: false,
            lockout_end: None,
            access_failed_count: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn with_name(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// "First Last", falling back to the email address
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    pub fn is_locked_out_at(&self, at: DateTime<Utc>) -> bool {
        self.lockout_end.map_or(false, |end| end > at)
    }

    /// Count a failed login; locks the account once the limit is hit.
    pub fn record_failed_access(&mut self, at: DateTime<Utc>) {
        self.access_failed_count += 1;
        if self.access_failed_count >= MAX_FAILED_ACCESS_ATTEMPTS {
            self.lockout_end = Some(at + Duration::minutes(LOCKOUT_MINUTES));
            self.access_failed_count = 0;
        }
        self.updated_at = Some(at);
    }

    pub fn reset_failed_access(&mut self) {
        self.access_failed_count = 0;
        self.lockout_end = None;
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// Stored refresh token; only the SHA-256 hash of the raw token is kept
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Generate a raw token for the client and the entity to persist.
    pub fn generate_token_pair(user_id: &str, lifetime: Duration) -> (String, RefreshToken) {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw = URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now();
        let entity = RefreshToken {
            token_hash: Self::hash_token(&raw),
            user_id: user_id.to_string(),
            expires_at: now + lifetime,
            revoked: false,
            created_at: now,
        };
        (raw, entity)
    }

    pub fn hash_token(raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = ApplicationUser::new("rider@example.com", "hash");
        assert_eq!(user.display_name(), "rider@example.com");

        let user = user.with_name(Some("Ada".into()), Some("Lovelace".into()));
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_lockout_after_repeated_failures() {
        let now = Utc::now();
        let mut user = ApplicationUser::new("rider@example.com", "hash");
        for _ in 0..MAX_FAILED_ACCESS_ATTEMPTS - 1 {
            user.record_failed_access(now);
        }
        assert!(!user.is_locked_out_at(now));

        user.record_failed_access(now);
        assert!(user.is_locked_out_at(now));
        assert!(!user.is_locked_out_at(now + Duration::minutes(LOCKOUT_MINUTES + 1)));
    }

    #[test]
    fn test_refresh_token_pair() {
        let (raw, token) = RefreshToken::generate_token_pair("user-1", Duration::days(14));
        assert_eq!(token.token_hash, RefreshToken::hash_token(&raw));
        assert_ne!(token.token_hash, raw);
        assert!(token.is_valid_at(Utc::now()));
        assert!(!token.is_valid_at(Utc::now() + Duration::days(15)));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Rider@Example.com "), "RIDER@EXAMPLE.COM");
    }
}
