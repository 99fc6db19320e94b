//! Role Sync Service
//!
//! Makes sure every built-in role exists at startup and optionally seeds an
//! administrator account.

use std::sync::Arc;

use sr_common::roles;
use tracing::{debug, info};

use crate::domain::ApplicationUser;
use crate::error::Result;
use crate::repository::{RoleRepository, UserRepository};
use crate::service::password::PasswordService;

pub struct RoleSyncService {
    role_repo: RoleRepository,
}

impl RoleSyncService {
    pub fn new(role_repo: RoleRepository) -> Self {
        Self { role_repo }
    }

    /// Create any missing built-in role. Returns how many were created.
    pub async fn sync_code_defined_roles(&self) -> Result<usize> {
        let mut created = 0;
        for role in roles::ALL_ROLES {
            if self.role_repo.ensure(role).await? {
                debug!(role = %role, "Created role");
                created += 1;
            }
        }
        info!(created, total = roles::ALL_ROLES.len(), "Role sync complete");
        Ok(created)
    }
}

/// Creates the configured administrator on first start.
pub struct AdminSeeder {
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
}

impl AdminSeeder {
    pub fn new(user_repo: Arc<UserRepository>, password_service: Arc<PasswordService>) -> Self {
        Self { user_repo, password_service }
    }

    /// Returns false when the account already existed. An existing account
    /// still gets the Admin role.
    pub async fn seed(&self, email: &str, password: &str) -> Result<bool> {
        if let Some(existing) = self.user_repo.find_by_email(email).await? {
            self.user_repo.add_role(&existing.id, roles::ADMIN).await?;
            return Ok(false);
        }

        let hash = self.password_service.hash_new_password(password)?;
        let mut admin = ApplicationUser::new(email.trim(), hash);
        admin.email_confirmed = true;
        self.user_repo.insert(&admin).await?;
        self.user_repo.add_role(&admin.id, roles::ADMIN).await?;
        self.user_repo.add_role(&admin.id, roles::USER).await?;

        info!(user_id = %admin.id, email = %admin.email, "Seeded administrator account");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository;

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let pool = repository::open("sqlite::memory:", 1).await.unwrap();
        let sync = RoleSyncService::new(RoleRepository::new(&pool));

        assert_eq!(sync.sync_code_defined_roles().await.unwrap(), roles::ALL_ROLES.len());
        assert_eq!(sync.sync_code_defined_roles().await.unwrap(), 0);
        assert!(RoleRepository::new(&pool).exists("showholder").await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_seed() {
        let pool = repository::open("sqlite::memory:", 1).await.unwrap();
        RoleSyncService::new(RoleRepository::new(&pool))
            .sync_code_defined_roles()
            .await
            .unwrap();

        let users = Arc::new(UserRepository::new(&pool));
        let seeder = AdminSeeder::new(users.clone(), Arc::new(PasswordService::default()));
        assert!(seeder.seed("admin@example.com", "paddock99").await.unwrap());
        assert!(!seeder.seed("admin@example.com", "paddock99").await.unwrap());

        let admin = users.find_by_email("admin@example.com").await.unwrap().unwrap();
        let granted = users.roles_for(&admin.id).await.unwrap();
        assert!(granted.contains(&roles::ADMIN.to_string()));
        assert!(admin.email_confirmed);
    }
}
