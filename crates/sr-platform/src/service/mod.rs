//! Service Layer
//!
//! Business logic services for the platform.
//! Includes authentication, authorization, identity and show-holder services.

pub mod auth;
pub mod authorization;
pub mod identity;
pub mod password;
pub mod role_sync;
pub mod show_holder;

pub use auth::{AuthService, AuthConfig, AccessTokenClaims, extract_bearer_token};
pub use authorization::{AuthorizationService, AuthContext, Policy, checks};
pub use identity::IdentityService;
pub use password::{PasswordService, PasswordPolicy};
pub use role_sync::{RoleSyncService, AdminSeeder};
pub use show_holder::ShowHolderService;
