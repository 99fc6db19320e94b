//! Identity Service
//!
//! Registration, password login with lockout, refresh token rotation and
//! logout for application users.

use std::sync::Arc;

use chrono::Utc;
use sr_common::{roles, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use tracing::{debug, info, warn};

use crate::domain::{ApplicationUser, RefreshToken};
use crate::error::{PlatformError, Result};
use crate::repository::{RefreshTokenRepository, UserRepository};
use crate::service::auth::AuthService;
use crate::service::password::PasswordService;

/// `local@domain.tld` with no whitespace
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

pub struct IdentityService {
    user_repo: Arc<UserRepository>,
    refresh_repo: Arc<RefreshTokenRepository>,
    auth_service: Arc<AuthService>,
    password_service: Arc<PasswordService>,
    require_confirmed_account: bool,
}

impl IdentityService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        refresh_repo: Arc<RefreshTokenRepository>,
        auth_service: Arc<AuthService>,
        password_service: Arc<PasswordService>,
        require_confirmed_account: bool,
    ) -> Self {
        Self {
            user_repo,
            refresh_repo,
            auth_service,
            password_service,
            require_confirmed_account,
        }
    }

    /// Create an account with the default role.
    ///
    /// When confirmation is required the account starts unconfirmed and
    /// cannot log in until an administrator confirms it.
    pub async fn register(&self, req: &RegisterRequest) -> Result<ApplicationUser> {
        let email = req.email.trim();
        if !is_plausible_email(email) {
            return Err(PlatformError::validation("A valid email address is required"));
        }
        if self.user_repo.exists_by_email(email).await? {
            return Err(PlatformError::duplicate("User", "email", email));
        }

        let hash = self.password_service.hash_new_password(&req.password)?;
        let mut user = ApplicationUser::new(email, hash)
            .with_name(req.first_name.clone(), req.last_name.clone());
        user.email_confirmed = !self.require_confirmed_account;

        self.user_repo.insert(&user).await?;
        if !self.user_repo.add_role(&user.id, roles::DEFAULT_ROLE).await? {
            warn!(user_id = %user.id, role = roles::DEFAULT_ROLE, "Default role missing; user registered without it");
        }

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let now = Utc::now();
        let Some(mut user) = self.user_repo.find_by_email(req.email.trim()).await? else {
            debug!("Login attempt for unknown email");
            return Err(PlatformError::InvalidCredentials);
        };

        if let Some(until) = user.lockout_end.filter(|end| *end > now) {
            return Err(PlatformError::AccountLocked { until });
        }

        if !self.password_service.verify_password(&req.password, &user.password_hash)? {
            user.record_failed_access(now);
            self.user_repo.update(&user).await?;
            if let Some(until) = user.lockout_end.filter(|end| *end > now) {
                warn!(user_id = %user.id, %until, "Account locked after repeated failed logins");
            }
            return Err(PlatformError::InvalidCredentials);
        }

        if self.require_confirmed_account && !user.email_confirmed {
            return Err(PlatformError::unauthorized("Email address has not been confirmed"));
        }

        if user.access_failed_count > 0 || user.lockout_end.is_some() {
            user.reset_failed_access();
            user.updated_at = Some(now);
            self.user_repo.update(&user).await?;
        }

        info!(user_id = %user.id, "User logged in");
        self.issue_tokens(&user).await
    }

    /// Exchange a refresh token for a new pair. The presented token is revoked.
    pub async fn refresh(&self, raw_token: &str) -> Result<LoginResponse> {
        let hash = RefreshToken::hash_token(raw_token.trim());
        let token = self
            .refresh_repo
            .find_valid_by_hash(&hash)
            .await?
            .ok_or_else(|| PlatformError::InvalidToken {
                message: "Refresh token is invalid or expired".to_string(),
            })?;

        // a concurrent refresh may have revoked it first
        if !self.refresh_repo.revoke_by_hash(&hash).await? {
            return Err(PlatformError::InvalidToken {
                message: "Refresh token already used".to_string(),
            });
        }

        let user = self
            .user_repo
            .find_by_id(&token.user_id)
            .await?
            .ok_or_else(|| PlatformError::InvalidToken {
                message: "Refresh token owner no longer exists".to_string(),
            })?;
        if let Some(until) = user.lockout_end.filter(|end| *end > Utc::now()) {
            return Err(PlatformError::AccountLocked { until });
        }

        debug!(user_id = %user.id, "Refresh token rotated");
        self.issue_tokens(&user).await
    }

    /// Revoke every refresh token held by the user.
    pub async fn logout(&self, user_id: &str) -> Result<u64> {
        let revoked = self.refresh_repo.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "User logged out");
        Ok(revoked)
    }

    pub async fn user_info(&self, user_id: &str) -> Result<UserInfo> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("User", user_id))?;
        let roles = self.user_repo.roles_for(&user.id).await?;

        Ok(UserInfo {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles,
        })
    }

    async fn issue_tokens(&self, user: &ApplicationUser) -> Result<LoginResponse> {
        let roles = self.user_repo.roles_for(&user.id).await?;
        let access_token = self.auth_service.generate_access_token(user, &roles)?;

        let (refresh_token, entity) =
            RefreshToken::generate_token_pair(&user.id, self.auth_service.refresh_token_lifetime());
        self.refresh_repo.insert(&entity).await?;

        Ok(LoginResponse {
            token_type: "Bearer".to_string(),
            access_token,
            expires_in: self.auth_service.access_token_expiry_secs(),
            refresh_token,
            user_id: user.id.clone(),
            roles: Some(roles),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MAX_FAILED_ACCESS_ATTEMPTS;
    use crate::repository::{self, RoleRepository};
    use crate::service::auth::AuthConfig;

    async fn service(require_confirmed_account: bool) -> IdentityService {
        let pool = repository::open("sqlite::memory:", 1).await.unwrap();
        let role_repo = RoleRepository::new(&pool);
        for role in roles::ALL_ROLES {
            role_repo.ensure(role).await.unwrap();
        }
        let auth = AuthService::new(AuthConfig {
            secret: "identity-test-secret-identity-test".to_string(),
            issuer: "showring".to_string(),
            access_token_expiry_secs: 3600,
            refresh_token_expiry_secs: 86400,
        });
        IdentityService::new(
            Arc::new(UserRepository::new(&pool)),
            Arc::new(RefreshTokenRepository::new(&pool)),
            Arc::new(auth),
            Arc::new(PasswordService::default()),
            require_confirmed_account,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "gallop123".to_string(),
            first_name: Some("Rae".to_string()),
            last_name: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_email_check() {
        assert!(is_plausible_email("rae@example.com"));
        assert!(!is_plausible_email("rae@example"));
        assert!(!is_plausible_email("rae @example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("rae@@example.com"));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let svc = service(false).await;
        let user = svc.register(&register_request("rae@example.com")).await.unwrap();

        let response = svc.login(&login_request("RAE@example.com", "gallop123")).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.user_id, user.id);
        assert_eq!(response.roles, Some(vec![roles::USER.to_string()]));

        let info = svc.user_info(&user.id).await.unwrap();
        assert_eq!(info.first_name.as_deref(), Some("Rae"));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_weak_passwords() {
        let svc = service(false).await;
        svc.register(&register_request("rae@example.com")).await.unwrap();

        let err = svc.register(&register_request("rae@example.com")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Duplicate { .. }));

        let weak = RegisterRequest {
            password: "short".to_string(),
            ..register_request("other@example.com")
        };
        assert!(matches!(svc.register(&weak).await, Err(PlatformError::Validation { .. })));

        let bad_email = register_request("not-an-email");
        assert!(matches!(svc.register(&bad_email).await, Err(PlatformError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_repeated_failures_lock_account() {
        let svc = service(false).await;
        svc.register(&register_request("rae@example.com")).await.unwrap();

        for _ in 0..MAX_FAILED_ACCESS_ATTEMPTS {
            let err = svc.login(&login_request("rae@example.com", "wrong-pass1")).await.unwrap_err();
            assert!(matches!(err, PlatformError::InvalidCredentials));
        }

        let err = svc.login(&login_request("rae@example.com", "gallop123")).await.unwrap_err();
        assert!(matches!(err, PlatformError::AccountLocked { .. }));
    }

    #[tokio::test]
    async fn test_unconfirmed_account_cannot_login() {
        let svc = service(true).await;
        svc.register(&register_request("rae@example.com")).await.unwrap();

        let err = svc.login(&login_request("rae@example.com", "gallop123")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let svc = service(false).await;
        svc.register(&register_request("rae@example.com")).await.unwrap();
        let first = svc.login(&login_request("rae@example.com", "gallop123")).await.unwrap();

        let second = svc.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        let reused = svc.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(reused, PlatformError::InvalidToken { .. }));

        assert_eq!(svc.logout(&second.user_id).await.unwrap(), 1);
        assert!(svc.refresh(&second.refresh_token).await.is_err());
    }
}
