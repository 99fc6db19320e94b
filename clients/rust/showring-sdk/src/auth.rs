//! Session-level authentication service
//!
//! Wraps [`AuthStateProvider`] with the user id and roles from the login
//! response, kept both in memory and in secure storage.

use std::sync::Arc;

use parking_lot::Mutex;
use sr_common::LoginRequest;
use tracing::{debug, warn};

use crate::auth_state::{AuthStateProvider, LoginStatus};
use crate::token::{USER_ID_KEY, USER_ROLES_KEY};

#[derive(Default)]
struct UserCache {
    user_id: Option<String>,
    roles: Option<Vec<String>>,
}

pub struct AuthService {
    provider: Arc<AuthStateProvider>,
    cache: Mutex<UserCache>,
}

impl AuthService {
    pub fn new(provider: Arc<AuthStateProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(UserCache::default()),
        }
    }

    pub fn provider(&self) -> &Arc<AuthStateProvider> {
        &self.provider
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        if self.provider.login(&request).await != LoginStatus::Success {
            return false;
        }

        let Some(info) = self.provider.access_token_info().await else {
            return false;
        };

        let user_id = info.login_response.user_id.clone();
        let roles = info.login_response.roles.clone().filter(|r| !r.is_empty());
        let provider = self.provider.storage().provider();

        if !user_id.is_empty() {
            if let Err(e) = provider.set(USER_ID_KEY, &user_id).await {
                warn!("Failed to store user id: {}", e);
            }
        }
        if let Some(roles) = &roles {
            match serde_json::to_string(roles) {
                Ok(json) => {
                    if let Err(e) = provider.set(USER_ROLES_KEY, &json).await {
                        warn!("Failed to store user roles: {}", e);
                    }
                }
                Err(e) => warn!("Failed to encode user roles: {}", e),
            }
        }

        let mut cache = self.cache.lock();
        cache.user_id = Some(user_id).filter(|id| !id.is_empty());
        cache.roles = roles;
        true
    }

    pub async fn logout(&self) {
        self.provider.logout().await;
        let provider = self.provider.storage().provider();
        for key in [USER_ID_KEY, USER_ROLES_KEY] {
            if let Err(e) = provider.remove(key).await {
                warn!(key, "Failed to clear stored value: {}", e);
            }
        }
        *self.cache.lock() = UserCache::default();
        debug!("Logged out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.provider.has_valid_session().await
    }

    pub async fn current_user_id(&self) -> Option<String> {
        if let Some(id) = self.cache.lock().user_id.clone() {
            return Some(id);
        }

        let id = match self.provider.storage().provider().get(USER_ID_KEY).await {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("Failed to read user id: {}", e);
                None
            }
        }?;
        self.cache.lock().user_id = Some(id.clone());
        Some(id)
    }

    pub async fn current_user_roles(&self) -> Option<Vec<String>> {
        if let Some(roles) = self.cache.lock().roles.clone() {
            return Some(roles);
        }

        let raw = match self.provider.storage().provider().get(USER_ROLES_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read user roles: {}", e);
                return None;
            }
        };
        let roles: Vec<String> = match serde_json::from_str(&raw) {
            Ok(roles) => roles,
            Err(e) => {
                warn!("Stored roles are unreadable: {}", e);
                return None;
            }
        };
        self.cache.lock().roles = Some(roles.clone());
        Some(roles)
    }

    /// Role names compare case-insensitively, as they do on the server.
    pub async fn is_in_role(&self, role: &str) -> bool {
        self.current_user_roles()
            .await
            .is_some_and(|roles| roles.iter().any(|r| r.eq_ignore_ascii_case(role)))
    }
}
