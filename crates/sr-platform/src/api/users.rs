//! Users Admin API
//!
//! Account listing and role membership management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use sr_common::UserDto;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::middleware::Authenticated;
use crate::domain::ApplicationUser;
use crate::error::PlatformError;
use crate::repository::{RoleRepository, UserRepository};
use crate::service::checks;

/// Map a user and the roles they hold.
pub fn user_dto(user: ApplicationUser, roles: Vec<String>) -> UserDto {
    let is_locked_out = user.is_locked_out_at(Utc::now());
    UserDto {
        id: user.id,
        user_name: Some(user.user_name),
        email: Some(user.email),
        first_name: user.first_name,
        last_name: user.last_name,
        is_locked_out,
        email_confirmed: user.email_confirmed,
        roles,
    }
}

/// Role to grant
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddRoleQuery {
    pub role: Option<String>,
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
    pub role_repo: Arc<RoleRepository>,
}

impl UsersState {
    async fn load(&self, id: &str) -> Result<ApplicationUser, PlatformError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("User", id))
    }

    async fn to_dto(&self, user: ApplicationUser) -> Result<UserDto, PlatformError> {
        let roles = self.user_repo.roles_for(&user.id).await?;
        Ok(user_dto(user, roles))
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users with roles", body = Vec<UserDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<Json<Vec<UserDto>>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let users = state.user_repo.find_all().await?;
    let mut dtos = Vec::with_capacity(users.len());
    for user in users {
        dtos.push(state.to_dto(user).await?);
    }
    Ok(Json(dtos))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, PlatformError> {
    checks::require_admin(&auth.0)?;
    let user = state.load(&id).await?;
    Ok(Json(state.to_dto(user).await?))
}

/// Get user by email
#[utoipa::path(
    get,
    path = "/api/users/by-email/{email}",
    tag = "users",
    params(
        ("email" = String, Path, description = "Email address")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 403, description = "Another user's account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_by_email(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(email): Path<String>,
) -> Result<Json<UserDto>, PlatformError> {
    if !auth.0.is_admin() && !auth.0.email.eq_ignore_ascii_case(email.trim()) {
        return Err(PlatformError::forbidden("Access to another user's data requires Admin"));
    }

    let user = state
        .user_repo
        .find_by_email(&email)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &email))?;
    Ok(Json(state.to_dto(user).await?))
}

/// Roles held by a user
#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Role names", body = Vec<String>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_roles(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, PlatformError> {
    checks::require_self_or_admin(&auth.0, &id)?;
    let user = state.load(&id).await?;
    Ok(Json(state.user_repo.roles_for(&user.id).await?))
}

/// Grant a role
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID"),
        AddRoleQuery
    ),
    responses(
        (status = 200, description = "Roles after the grant", body = Vec<String>),
        (status = 400, description = "Role missing"),
        (status = 404, description = "User or role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_user_role(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<AddRoleQuery>,
) -> Result<Json<Vec<String>>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let role_name = query
        .role
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| PlatformError::validation("The 'role' parameter is required."))?;
    let user = state.load(&id).await?;
    let role = state
        .role_repo
        .find_by_name(&role_name)
        .await?
        .ok_or_else(|| PlatformError::not_found("Role", &role_name))?;

    if state.user_repo.add_role(&user.id, &role.name).await? {
        tracing::info!(user_id = %user.id, role = %role.name, "Role granted");
    }
    Ok(Json(state.user_repo.roles_for(&user.id).await?))
}

/// Revoke a role
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID"),
        ("role" = String, Path, description = "Role name")
    ),
    responses(
        (status = 204, description = "Role revoked"),
        (status = 404, description = "User does not hold the role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_user_role(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, role)): Path<(String, String)>,
) -> Result<Response, PlatformError> {
    checks::require_admin(&auth.0)?;

    let user = state.load(&id).await?;
    if state.user_repo.remove_role(&user.id, &role).await? {
        tracing::info!(user_id = %user.id, role = %role, "Role revoked");
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("UserRole", format!("{}/{}", id, role)))
    }
}

/// Create users router
pub fn users_router(state: UsersState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/by-email/:email", get(get_user_by_email))
        .route("/:id/roles", get(get_user_roles).post(add_user_role))
        .route("/:id/roles/:role", delete(remove_user_role))
        .with_state(state)
}
