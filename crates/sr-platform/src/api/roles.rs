//! Roles Admin API
//!
//! REST endpoints for role management. Admin only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use sr_common::{RoleDto, RoleUserCount};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::created;
use crate::api::middleware::Authenticated;
use crate::domain::Role;
use crate::error::PlatformError;
use crate::repository::{RoleRepository, UserRepository};
use crate::service::checks;

impl From<Role> for RoleDto {
    fn from(r: Role) -> Self {
        Self { id: r.id, name: r.name }
    }
}

/// Role name for create
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateRoleQuery {
    pub name: Option<String>,
}

/// New name for rename
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RenameRoleQuery {
    pub new_name: Option<String>,
}

/// Roles service state
#[derive(Clone)]
pub struct RolesState {
    pub role_repo: Arc<RoleRepository>,
    pub user_repo: Arc<UserRepository>,
}

fn required(value: Option<String>, param: &str) -> Result<String, PlatformError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlatformError::validation(format!("The '{}' parameter is required.", param)))
}

/// List roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "roles",
    responses(
        (status = 200, description = "All roles", body = Vec<RoleDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<RolesState>,
    auth: Authenticated,
) -> Result<Json<Vec<RoleDto>>, PlatformError> {
    checks::require_admin(&auth.0)?;
    let roles = state.role_repo.find_all().await?;
    Ok(Json(roles.into_iter().map(RoleDto::from).collect()))
}

/// Create a role
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "roles",
    params(CreateRoleQuery),
    responses(
        (status = 201, description = "Role created", body = RoleDto),
        (status = 400, description = "Name missing"),
        (status = 409, description = "Role already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<RolesState>,
    auth: Authenticated,
    Query(query): Query<CreateRoleQuery>,
) -> Result<Response, PlatformError> {
    checks::require_admin(&auth.0)?;
    let name = required(query.name, "name")?;

    let role = state.role_repo.create(&name).await?;
    tracing::info!(role = %role.name, "Role created");
    Ok(created(format!("/api/roles/{}", role.name), RoleDto::from(role)))
}

/// Rename a role
#[utoipa::path(
    put,
    path = "/api/roles/{name}",
    tag = "roles",
    params(
        ("name" = String, Path, description = "Current role name"),
        RenameRoleQuery
    ),
    responses(
        (status = 200, description = "Role renamed", body = RoleDto),
        (status = 404, description = "Role not found"),
        (status = 409, description = "New name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_role(
    State(state): State<RolesState>,
    auth: Authenticated,
    Path(name): Path<String>,
    Query(query): Query<RenameRoleQuery>,
) -> Result<Json<RoleDto>, PlatformError> {
    checks::require_admin(&auth.0)?;
    let new_name = required(query.new_name, "newName")?;

    if !state.role_repo.rename(&name, &new_name).await? {
        return Err(PlatformError::not_found("Role", &name));
    }
    let role = state
        .role_repo
        .find_by_name(&new_name)
        .await?
        .ok_or_else(|| PlatformError::not_found("Role", &new_name))?;
    Ok(Json(role.into()))
}

/// Delete a role
#[utoipa::path(
    delete,
    path = "/api/roles/{name}",
    tag = "roles",
    params(
        ("name" = String, Path, description = "Role name")
    ),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<RolesState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require_admin(&auth.0)?;

    if state.role_repo.delete(&name).await? {
        tracing::info!(role = %name, "Role deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Role", &name))
    }
}

/// Count users holding a role
#[utoipa::path(
    get,
    path = "/api/roles/{name}/count",
    tag = "roles",
    params(
        ("name" = String, Path, description = "Role name")
    ),
    responses(
        (status = 200, description = "Member count", body = RoleUserCount),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn count_users_in_role(
    State(state): State<RolesState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<RoleUserCount>, PlatformError> {
    checks::require_admin(&auth.0)?;

    let role = state
        .role_repo
        .find_by_name(&name)
        .await?
        .ok_or_else(|| PlatformError::not_found("Role", &name))?;
    let count = state.user_repo.count_in_role(&role.name).await?;
    Ok(Json(RoleUserCount { role: role.name, count }))
}

/// Create roles router
pub fn roles_router(state: RolesState) -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:name", put(rename_role).delete(delete_role))
        .route("/:name/count", get(count_users_in_role))
        .with_state(state)
}
