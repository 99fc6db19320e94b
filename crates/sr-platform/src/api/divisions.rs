//! Divisions API
//!
//! REST endpoints for the divisions of a show.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sr_common::{DivisionDto, DivisionRequest, ShowClassDto};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::Division;
use crate::error::PlatformError;
use crate::repository::{DivisionRepository, ShowRepository};
use crate::service::{checks, Policy};

impl From<Division> for DivisionDto {
    fn from(d: Division) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            division_type: d.division_type.to_string(),
            sort_order: d.sort_order,
            show_id: d.show_id,
            show_classes: d.classes.into_iter().map(ShowClassDto::from).collect(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Query parameters for the divisions list
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DivisionsQuery {
    /// Show whose divisions to list
    pub show_id: Option<String>,
}

/// Divisions service state
#[derive(Clone)]
pub struct DivisionsState {
    pub division_repo: Arc<DivisionRepository>,
    pub show_repo: Arc<ShowRepository>,
}

impl DivisionsState {
    async fn ensure_show_exists(&self, show_id: i64) -> Result<(), PlatformError> {
        if !self.show_repo.exists(show_id).await? {
            return Err(PlatformError::validation(format!("Show {} does not exist", show_id)));
        }
        Ok(())
    }
}

/// List divisions of a show
///
/// Ordered by sort order then name, each with its classes.
#[utoipa::path(
    get,
    path = "/api/divisions",
    tag = "divisions",
    params(DivisionsQuery),
    responses(
        (status = 200, description = "Divisions of the show", body = Vec<DivisionDto>),
        (status = 400, description = "showId missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_divisions(
    State(state): State<DivisionsState>,
    _auth: Authenticated,
    Query(query): Query<DivisionsQuery>,
) -> Result<Json<Vec<DivisionDto>>, PlatformError> {
    let raw = query
        .show_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PlatformError::validation("The 'showId' parameter is required."))?;

    let divisions = match parse_id(&raw) {
        Some(show_id) => state.division_repo.find_by_show_id(show_id).await?,
        None => Vec::new(),
    };
    Ok(Json(divisions.into_iter().map(DivisionDto::from).collect()))
}

/// Get division by ID
#[utoipa::path(
    get,
    path = "/api/divisions/{id}",
    tag = "divisions",
    params(
        ("id" = String, Path, description = "Division ID")
    ),
    responses(
        (status = 200, description = "Division found", body = DivisionDto),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_division(
    State(state): State<DivisionsState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<DivisionDto>, PlatformError> {
    let division_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Division", &id))?;
    let division = state
        .division_repo
        .find_by_id(division_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Division", &id))?;

    Ok(Json(division.into()))
}

/// Create a division
#[utoipa::path(
    post,
    path = "/api/divisions",
    tag = "divisions",
    request_body = DivisionRequest,
    responses(
        (status = 201, description = "Division created", body = DivisionDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_division(
    State(state): State<DivisionsState>,
    auth: Authenticated,
    Json(req): Json<DivisionRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;
    state.ensure_show_exists(req.show_id).await?;

    let division = Division::from_request(&req)?;
    let id = state.division_repo.insert(&division).await?;

    let division = state
        .division_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created division could not be reloaded"))?;
    Ok(created(format!("/api/divisions/{}", id), DivisionDto::from(division)))
}

/// Update a division
#[utoipa::path(
    put,
    path = "/api/divisions/{id}",
    tag = "divisions",
    params(
        ("id" = String, Path, description = "Division ID")
    ),
    request_body = DivisionRequest,
    responses(
        (status = 200, description = "Division updated", body = DivisionDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_division(
    State(state): State<DivisionsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<DivisionRequest>,
) -> Result<Json<DivisionDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let division_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Division", &id))?;
    if req.id.is_some_and(|body_id| body_id != division_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut division = state
        .division_repo
        .find_by_id(division_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Division", &id))?;
    if req.show_id != division.show_id {
        state.ensure_show_exists(req.show_id).await?;
    }

    division.apply_request(&req)?;
    division.touch();
    state.division_repo.update(&division).await?;

    let division = state
        .division_repo
        .find_by_id(division_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Division", &id))?;
    Ok(Json(division.into()))
}

/// Delete a division
#[utoipa::path(
    delete,
    path = "/api/divisions/{id}",
    tag = "divisions",
    params(
        ("id" = String, Path, description = "Division ID")
    ),
    responses(
        (status = 204, description = "Division deleted"),
        (status = 404, description = "Division not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_division(
    State(state): State<DivisionsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let deleted = match parse_id(&id) {
        Some(division_id) => state.division_repo.soft_delete(division_id).await?,
        None => false,
    };
    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Division", &id))
    }
}

/// Create divisions router
pub fn divisions_router(state: DivisionsState) -> Router {
    Router::new()
        .route("/", get(list_divisions).post(create_division))
        .route("/:id", get(get_division).put(update_division).delete(delete_division))
        .with_state(state)
}
