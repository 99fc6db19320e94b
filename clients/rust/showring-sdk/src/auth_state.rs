//! Authentication state
//!
//! [`AuthStateProvider`] owns the cached token and keeps it fresh. Any caller
//! asking for the token while it is within the configured buffer of expiry
//! triggers a refresh against `identity/refresh`. The cache lock is held for
//! the whole check-and-refresh, so concurrent callers share one refresh.

use chrono::Utc;
use parking_lot::Mutex;
use reqwest::StatusCode;
use sr_common::{LoginRequest, RefreshRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::token::{AccessTokenInfo, TokenStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    None,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { email: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Authenticated { email } => Some(email),
            Self::Anonymous => None,
        }
    }
}

#[derive(Default)]
struct LoginOutcome {
    status: LoginStatus,
    failure_message: String,
}

pub struct AuthStateProvider {
    config: ClientConfig,
    http: reqwest::Client,
    storage: TokenStorage,
    cached: tokio::sync::Mutex<Option<AccessTokenInfo>>,
    outcome: Mutex<LoginOutcome>,
    state_tx: watch::Sender<AuthState>,
}

impl AuthStateProvider {
    pub fn new(config: ClientConfig, storage: TokenStorage) -> Result<Self> {
        let http = config.build_http_client()?;
        Ok(Self::with_http_client(config, http, storage))
    }

    pub fn with_http_client(config: ClientConfig, http: reqwest::Client, storage: TokenStorage) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Anonymous);
        Self {
            config,
            http,
            storage,
            cached: tokio::sync::Mutex::new(None),
            outcome: Mutex::new(LoginOutcome::default()),
            state_tx,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    /// Receive every authentication state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Last published state, without touching storage.
    pub fn current_state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    pub fn login_status(&self) -> LoginStatus {
        self.outcome.lock().status
    }

    pub fn login_failure_message(&self) -> String {
        self.outcome.lock().failure_message.clone()
    }

    /// Resolve the current state, restoring a stored session if there is one.
    pub async fn auth_state(&self) -> AuthState {
        let current = self.current_state();
        if current.is_authenticated() {
            return current;
        }

        let mut cached = self.cached.lock().await;
        self.outcome.lock().status = LoginStatus::None;
        let state = if self.update_and_validate(&mut cached).await {
            let email = cached.as_ref().map(|t| t.email.clone()).unwrap_or_default();
            self.set_outcome(LoginStatus::Success, String::new());
            AuthState::Authenticated { email }
        } else {
            AuthState::Anonymous
        };

        self.state_tx.send_replace(state.clone());
        state
    }

    pub async fn login(&self, request: &LoginRequest) -> LoginStatus {
        let mut cached = self.cached.lock().await;
        self.set_outcome(LoginStatus::None, String::new());

        match self.login_core(request).await {
            Ok(info) => {
                let email = info.email.clone();
                *cached = Some(info);
                self.set_outcome(LoginStatus::Success, String::new());
                self.state_tx.send_replace(AuthState::Authenticated { email });
            }
            Err(e) => {
                warn!(email = %request.email, "Login failed: {}", e);
                self.set_outcome(LoginStatus::Failed, failure_message(&e));
                *cached = None;
                self.state_tx.send_replace(AuthState::Anonymous);
            }
        }

        self.login_status()
    }

    pub async fn logout(&self) {
        let mut cached = self.cached.lock().await;
        self.clear(&mut cached).await;
    }

    /// Current token, refreshed if it is inside the expiry buffer.
    ///
    /// Returns `None` and logs out when no usable token can be produced.
    pub async fn access_token_info(&self) -> Option<AccessTokenInfo> {
        let mut cached = self.cached.lock().await;
        if self.update_and_validate(&mut cached).await {
            return cached.clone();
        }
        self.clear(&mut cached).await;
        None
    }

    pub async fn has_valid_session(&self) -> bool {
        self.access_token_info().await.is_some()
    }

    async fn login_core(&self, request: &LoginRequest) -> Result<AccessTokenInfo> {
        let url = self.config.login_url()?;
        debug!(%url, email = %request.email, "Attempting login");

        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SdkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let info = self.storage.save_token(&body, &request.email).await?;
        info!(email = %request.email, expires_at = %info.access_token_expiration, "Login succeeded");
        Ok(info)
    }

    /// Bring `cached` up to date. True when it holds a usable token afterwards.
    async fn update_and_validate(&self, cached: &mut Option<AccessTokenInfo>) -> bool {
        let threshold = Utc::now() + self.config.token_expiration_buffer;

        if cached
            .as_ref()
            .map_or(true, |token| threshold > token.access_token_expiration)
        {
            *cached = self.storage.get_token().await;
        }

        let Some(token) = cached.as_ref() else {
            return false;
        };
        if threshold < token.access_token_expiration {
            return true;
        }

        let refresh_token = token.refresh_token().to_string();
        let email = token.email.clone();
        match self.refresh(&refresh_token, &email).await {
            Ok(Some(info)) => {
                *cached = Some(info);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Error refreshing access token: {}", e);
                false
            }
        }
    }

    async fn refresh(&self, refresh_token: &str, email: &str) -> Result<Option<AccessTokenInfo>> {
        if refresh_token.is_empty() {
            return Ok(None);
        }

        let url = self.config.refresh_url()?;
        debug!(%url, "Refreshing access token");
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Token refresh rejected");
            return Ok(None);
        }

        let body = response.text().await?;
        let info = self.storage.save_token(&body, email).await?;
        info!(expires_at = %info.access_token_expiration, "Access token refreshed");
        Ok(Some(info))
    }

    async fn clear(&self, cached: &mut Option<AccessTokenInfo>) {
        *cached = None;
        self.outcome.lock().status = LoginStatus::None;
        if let Err(e) = self.storage.remove_token().await {
            warn!("Failed to remove token: {}", e);
        }
        self.state_tx.send_replace(AuthState::Anonymous);
    }

    fn set_outcome(&self, status: LoginStatus, failure_message: String) {
        let mut outcome = self.outcome.lock();
        outcome.status = status;
        outcome.failure_message = failure_message;
    }
}

fn failure_message(error: &SdkError) -> String {
    match error {
        SdkError::Status { status, body } => {
            let reason = StatusCode::from_u16(*status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("");
            let mut message = format!("Login failed: {}", status);
            if !reason.is_empty() {
                message.push(' ');
                message.push_str(reason);
            }
            if !body.is_empty() {
                message.push_str(" - ");
                message.push_str(body);
            }
            message
        }
        SdkError::Http(e) => {
            let chain = error_chain(e);
            let lower = chain.to_lowercase();
            if lower.contains("certificate") || lower.contains("ssl") || lower.contains("tls") {
                "SSL/Certificate error. Check that the development certificate is trusted.".to_string()
            } else {
                format!("Network error: {}", chain)
            }
        }
        other => format!("An unexpected error occurred: {}", other),
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_message() {
        let error = SdkError::Status {
            status: 401,
            body: "{\"code\":\"INVALID_CREDENTIALS\"}".to_string(),
        };
        assert_eq!(
            failure_message(&error),
            "Login failed: 401 Unauthorized - {\"code\":\"INVALID_CREDENTIALS\"}"
        );

        let empty = SdkError::Status {
            status: 500,
            body: String::new(),
        };
        assert_eq!(failure_message(&empty), "Login failed: 500 Internal Server Error");

        let unknown = SdkError::Status {
            status: 599,
            body: "upstream".to_string(),
        };
        assert_eq!(failure_message(&unknown), "Login failed: 599 - upstream");
    }

    #[test]
    fn test_auth_state_accessors() {
        let state = AuthState::Authenticated {
            email: "rider@showring.test".to_string(),
        };
        assert!(state.is_authenticated());
        assert_eq!(state.email(), Some("rider@showring.test"));
        assert_eq!(AuthState::Anonymous.email(), None);
    }
}
