//! Token persistence

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sr_common::LoginResponse;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::SecureStorageProvider;

pub const TOKEN_KEY: &str = "auth_token";
pub const REMEMBER_ME_KEY: &str = "remember_me_email";
pub const USER_ID_KEY: &str = "user_id";
pub const USER_ROLES_KEY: &str = "user_roles";

/// Lifetime assumed when the server does not report a positive `expiresIn`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Cached login plus the moment its access token expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenInfo {
    pub login_response: LoginResponse,
    pub access_token_expiration: DateTime<Utc>,
    pub email: String,
}

impl AccessTokenInfo {
    pub fn access_token(&self) -> &str {
        &self.login_response.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.login_response.refresh_token
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at < self.access_token_expiration
    }
}

#[derive(Clone)]
pub struct TokenStorage {
    provider: Arc<dyn SecureStorageProvider>,
}

impl TokenStorage {
    pub fn new(provider: Arc<dyn SecureStorageProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn SecureStorageProvider> {
        &self.provider
    }

    /// Load the stored token. An unreadable payload is removed.
    pub async fn get_token(&self) -> Option<AccessTokenInfo> {
        let raw = match self.provider.get(TOKEN_KEY).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!("No token found in secure storage");
                return None;
            }
            Err(e) => {
                warn!("Error retrieving token: {}", e);
                self.discard().await;
                return None;
            }
        };

        match serde_json::from_str::<AccessTokenInfo>(&raw) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Stored token is unreadable, removing it: {}", e);
                self.discard().await;
                None
            }
        }
    }

    /// Persist a raw login or refresh response body for `email`.
    pub async fn save_token(&self, token_json: &str, email: &str) -> Result<AccessTokenInfo> {
        let login_response: LoginResponse = serde_json::from_str(token_json)?;
        self.save_login_response(login_response, email).await
    }

    pub async fn save_login_response(&self, login_response: LoginResponse, email: &str) -> Result<AccessTokenInfo> {
        let expires_in = if login_response.expires_in > 0 {
            login_response.expires_in
        } else {
            DEFAULT_EXPIRES_IN_SECS
        };
        let info = AccessTokenInfo {
            login_response,
            access_token_expiration: Utc::now() + Duration::seconds(expires_in),
            email: email.to_string(),
        };

        self.provider.set(TOKEN_KEY, &serde_json::to_string(&info)?).await?;
        self.save_email_preference(email).await?;

        debug!(expires_at = %info.access_token_expiration, "Token saved");
        Ok(info)
    }

    pub async fn remove_token(&self) -> Result<()> {
        debug!("Removing token from secure storage");
        self.provider.remove(TOKEN_KEY).await
    }

    pub async fn has_valid_token(&self) -> bool {
        self.get_token()
            .await
            .is_some_and(|token| token.is_valid_at(Utc::now()))
    }

    pub async fn saved_email(&self) -> Option<String> {
        self.provider.get(REMEMBER_ME_KEY).await.ok().flatten()
    }

    pub async fn save_email_preference(&self, email: &str) -> Result<()> {
        self.provider.set(REMEMBER_ME_KEY, email).await
    }

    /// Drop the token, user id and roles. Failures are logged, not returned.
    pub async fn clear_credentials(&self) {
        for key in [TOKEN_KEY, USER_ID_KEY, USER_ROLES_KEY] {
            if let Err(e) = self.provider.remove(key).await {
                warn!(key, "Failed to clear credential: {}", e);
            }
        }
    }

    async fn discard(&self) {
        if let Err(e) = self.remove_token().await {
            warn!("Failed to remove token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySecureStorage;

    fn storage() -> TokenStorage {
        TokenStorage::new(Arc::new(MemorySecureStorage::new()))
    }

    fn login_json(expires_in: i64) -> String {
        serde_json::json!({
            "tokenType": "Bearer",
            "accessToken": "access",
            "expiresIn": expires_in,
            "refreshToken": "refresh",
            "userId": "u1",
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = storage();
        let saved = storage.save_token(&login_json(1800), "rider@showring.test").await.unwrap();

        let loaded = storage.get_token().await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.access_token(), "access");
        assert!(storage.has_valid_token().await);
        assert_eq!(storage.saved_email().await.as_deref(), Some("rider@showring.test"));

        let remaining = loaded.access_token_expiration - Utc::now();
        assert!(remaining > Duration::minutes(29) && remaining <= Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_non_positive_expiry_defaults_to_an_hour() {
        let storage = storage();
        let saved = storage.save_token(&login_json(0), "a@b.c").await.unwrap();
        let remaining = saved.access_token_expiration - Utc::now();
        assert!(remaining > Duration::minutes(59));
    }

    #[tokio::test]
    async fn test_corrupt_token_is_removed() {
        let storage = storage();
        storage.provider().set(TOKEN_KEY, "{garbage").await.unwrap();

        assert!(storage.get_token().await.is_none());
        assert_eq!(storage.provider().get(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_login_json_is_an_error() {
        assert!(storage().save_token("not json", "a@b.c").await.is_err());
    }

    #[tokio::test]
    async fn test_clear_credentials() {
        let storage = storage();
        storage.save_token(&login_json(600), "a@b.c").await.unwrap();
        storage.provider().set(USER_ID_KEY, "u1").await.unwrap();
        storage.provider().set(USER_ROLES_KEY, "[\"User\"]").await.unwrap();

        storage.clear_credentials().await;
        assert!(storage.get_token().await.is_none());
        assert_eq!(storage.provider().get(USER_ID_KEY).await.unwrap(), None);
        assert_eq!(storage.provider().get(USER_ROLES_KEY).await.unwrap(), None);
        // the remembered email survives
        assert_eq!(storage.saved_email().await.as_deref(), Some("a@b.c"));
    }
}
