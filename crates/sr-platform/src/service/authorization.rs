//! Authorization Service
//!
//! Resolves the caller's current roles and evaluates the named role
//! policies used by the API.

use std::sync::Arc;

use chrono::Utc;
use sr_common::roles;

use crate::error::{PlatformError, Result};
use crate::repository::UserRepository;
use crate::service::auth::AccessTokenClaims;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(roles::ADMIN)
    }

    pub fn satisfies(&self, policy: Policy) -> bool {
        policy.allowed_roles().iter().any(|role| self.has_role(role))
    }
}

/// Named role policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    RequireAdminRole,
    RequireJudgeRole,
    RequireModeratorRole,
    RequireUserRole,
    RequireShowHolderRole,
    RequireShowManagementRole,
}

impl Policy {
    pub fn allowed_roles(&self) -> &'static [&'static str] {
        match self {
            Policy::RequireAdminRole => &[roles::ADMIN],
            Policy::RequireJudgeRole => &[roles::JUDGE, roles::ADMIN],
            Policy::RequireModeratorRole => &[roles::MODERATOR, roles::ADMIN],
            Policy::RequireUserRole => &[roles::USER, roles::TRIAL_USER, roles::ADMIN],
            Policy::RequireShowHolderRole | Policy::RequireShowManagementRole => {
                &[roles::SHOW_HOLDER, roles::ADMIN]
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::RequireAdminRole => "RequireAdminRole",
            Policy::RequireJudgeRole => "RequireJudgeRole",
            Policy::RequireModeratorRole => "RequireModeratorRole",
            Policy::RequireUserRole => "RequireUserRole",
            Policy::RequireShowHolderRole => "RequireShowHolderRole",
            Policy::RequireShowManagementRole => "RequireShowManagementRole",
        }
    }
}

pub struct AuthorizationService {
    user_repo: Arc<UserRepository>,
}

impl AuthorizationService {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Build the caller context from validated claims.
    ///
    /// Roles are read from storage so grants and revocations apply without
    /// waiting for the token to be reissued.
    pub async fn build_context(&self, claims: &AccessTokenClaims) -> Result<AuthContext> {
        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| PlatformError::unauthorized("User no longer exists"))?;

        if user.is_locked_out_at(Utc::now()) {
            return Err(PlatformError::unauthorized("Account is locked"));
        }

        let roles = self.user_repo.roles_for(&user.id).await?;
        Ok(AuthContext {
            user_id: user.id,
            email: user.email,
            roles,
        })
    }
}

pub mod checks {
    use super::{AuthContext, Policy};
    use crate::error::{PlatformError, Result};

    pub fn require(ctx: &AuthContext, policy: Policy) -> Result<()> {
        if ctx.satisfies(policy) {
            Ok(())
        } else {
            Err(PlatformError::forbidden(format!("{} policy not satisfied", policy.name())))
        }
    }

    pub fn require_admin(ctx: &AuthContext) -> Result<()> {
        require(ctx, Policy::RequireAdminRole)
    }

    pub fn require_self_or_admin(ctx: &AuthContext, user_id: &str) -> Result<()> {
        if ctx.user_id == user_id || ctx.is_admin() {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Access to another user's data requires Admin"))
        }
    }

    /// Owner check for user-owned records such as horses.
    pub fn require_owner_or_admin(ctx: &AuthContext, owner_id: Option<&str>) -> Result<()> {
        if ctx.is_admin() || owner_id == Some(ctx.user_id.as_str()) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Only the owner can modify this record"))
        }
    }
}
