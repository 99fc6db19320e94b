//! Platform assembly
//!
//! Wires repositories, services and API states over one connection pool and
//! exposes the combined router. The server binary and the integration tests
//! both go through here.

use std::sync::Arc;

use axum::{Extension, Router};
use sqlx::SqlitePool;
use tracing::info;

use crate::api::{
    divisions_router, entries_router, identity_router, results_router, roles_router,
    show_classes_router, show_holder_router, shows_router, user_model_objects_router, users_router,
    AppState, DivisionsState, EntriesState, IdentityState, ResultsState, RolesState,
    ShowClassesState, ShowHolderState, ShowsState, UserModelObjectsState, UsersState,
};
use crate::error::Result;
use crate::repository::{
    DivisionRepository, EntryRepository, RefreshTokenRepository, ResultRepository, RoleRepository,
    ShowClassRepository, ShowRepository, UserModelObjectRepository, UserRepository,
};
use crate::service::{
    AdminSeeder, AuthConfig, AuthService, AuthorizationService, IdentityService, PasswordService,
    RoleSyncService, ShowHolderService,
};

pub struct Platform {
    pool: SqlitePool,
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
    app_state: AppState,
    identity_state: IdentityState,
    shows_state: ShowsState,
    show_holder_state: ShowHolderState,
    divisions_state: DivisionsState,
    show_classes_state: ShowClassesState,
    entries_state: EntriesState,
    results_state: ResultsState,
    user_model_objects_state: UserModelObjectsState,
    roles_state: RolesState,
    users_state: UsersState,
}

impl Platform {
    pub fn new(pool: SqlitePool, auth_config: AuthConfig, require_confirmed_account: bool) -> Self {
        let show_repo = Arc::new(ShowRepository::new(&pool));
        let division_repo = Arc::new(DivisionRepository::new(&pool));
        let class_repo = Arc::new(ShowClassRepository::new(&pool));
        let entry_repo = Arc::new(EntryRepository::new(&pool));
        let result_repo = Arc::new(ResultRepository::new(&pool));
        let horse_repo = Arc::new(UserModelObjectRepository::new(&pool));
        let user_repo = Arc::new(UserRepository::new(&pool));
        let role_repo = Arc::new(RoleRepository::new(&pool));
        let refresh_repo = Arc::new(RefreshTokenRepository::new(&pool));

        let auth_service = Arc::new(AuthService::new(auth_config));
        let authz_service = Arc::new(AuthorizationService::new(user_repo.clone()));
        let password_service = Arc::new(PasswordService::default());
        let identity_service = Arc::new(IdentityService::new(
            user_repo.clone(),
            refresh_repo,
            auth_service.clone(),
            password_service.clone(),
            require_confirmed_account,
        ));
        let show_holder_service = Arc::new(ShowHolderService::new(show_repo.clone(), horse_repo.clone()));

        Self {
            app_state: AppState {
                auth_service,
                authz_service,
            },
            identity_state: IdentityState { identity_service },
            shows_state: ShowsState {
                show_repo: show_repo.clone(),
                horse_repo: horse_repo.clone(),
            },
            show_holder_state: ShowHolderState { show_holder_service },
            divisions_state: DivisionsState {
                division_repo: division_repo.clone(),
                show_repo: show_repo.clone(),
            },
            show_classes_state: ShowClassesState {
                class_repo: class_repo.clone(),
                division_repo,
            },
            entries_state: EntriesState {
                entry_repo: entry_repo.clone(),
                class_repo,
                show_repo,
                horse_repo: horse_repo.clone(),
            },
            results_state: ResultsState { result_repo, entry_repo },
            user_model_objects_state: UserModelObjectsState { horse_repo },
            roles_state: RolesState {
                role_repo: role_repo.clone(),
                user_repo: user_repo.clone(),
            },
            users_state: UsersState {
                user_repo: user_repo.clone(),
                role_repo,
            },
            user_repo,
            password_service,
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// True when the database answers a trivial query.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Insert any code-defined role missing from the role table.
    pub async fn sync_roles(&self) -> Result<usize> {
        RoleSyncService::new(RoleRepository::new(&self.pool))
            .sync_code_defined_roles()
            .await
    }

    /// Ensure an administrator account exists. Returns `true` when one was created.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<bool> {
        AdminSeeder::new(self.user_repo.clone(), self.password_service.clone())
            .seed(email, password)
            .await
    }

    /// All API routes with the auth state attached.
    pub fn router(&self) -> Router {
        info!("Building platform router");
        Router::new()
            .nest("/identity", identity_router(self.identity_state.clone()))
            .nest("/api/shows", shows_router(self.shows_state.clone()))
            .nest("/api/showholder", show_holder_router(self.show_holder_state.clone()))
            .nest("/api/divisions", divisions_router(self.divisions_state.clone()))
            .nest("/api/showclasses", show_classes_router(self.show_classes_state.clone()))
            .nest("/api/entries", entries_router(self.entries_state.clone()))
            .nest("/api/results", results_router(self.results_state.clone()))
            .nest(
                "/api/userModelObjects",
                user_model_objects_router(self.user_model_objects_state.clone()),
            )
            .nest("/api/roles", roles_router(self.roles_state.clone()))
            .nest("/api/users", users_router(self.users_state.clone()))
            .layer(Extension(self.app_state.clone()))
    }
}
