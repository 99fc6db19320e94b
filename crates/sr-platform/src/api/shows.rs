//! Shows API
//!
//! REST endpoints for show management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sr_common::{DivisionDto, ShowDto, ShowRequest};
use std::sync::Arc;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::{Division, Show};
use crate::error::PlatformError;
use crate::repository::{ShowRepository, UserModelObjectRepository};
use crate::service::{checks, Policy};

impl From<Show> for ShowDto {
    fn from(s: Show) -> Self {
        show_dto(s, Vec::new())
    }
}

/// Map a show together with its loaded divisions.
pub fn show_dto(s: Show, divisions: Vec<Division>) -> ShowDto {
    ShowDto {
        id: s.id,
        name: s.name,
        description: s.description,
        show_date: s.show_date,
        end_date: s.end_date,
        status: s.status.to_string(),
        judge_id: s.judge_id,
        judge_name: s.judge_name.unwrap_or_default(),
        show_holder_id: s.show_holder_id,
        show_holder_name: s.show_holder_name.unwrap_or_default(),
        show_type: s.show_type.to_string(),
        show_format: s.show_format.to_string(),
        is_active: s.is_active,
        is_private: s.is_private,
        max_entries_per_user: s.max_entries_per_user,
        allow_member_only_entries: s.allow_member_only_entries,
        entry_deadline: s.entry_deadline,
        judging_deadline: s.judging_deadline,
        results_published_at: s.results_published_at,
        is_nan_qualifying: s.is_nan_qualifying,
        namhsa_guidelines: s.namhsa_guidelines,
        additional_metadata: s.additional_metadata,
        divisions: divisions.into_iter().map(DivisionDto::from).collect(),
        created_at: s.created_at,
        updated_at: s.updated_at,
    }
}

/// Shows service state
#[derive(Clone)]
pub struct ShowsState {
    pub show_repo: Arc<ShowRepository>,
    pub horse_repo: Arc<UserModelObjectRepository>,
}

impl ShowsState {
    async fn ensure_show_holder_exists(&self, show_holder_id: i64) -> Result<(), PlatformError> {
        if self.horse_repo.find_by_id(show_holder_id).await?.is_none() {
            return Err(PlatformError::validation(format!(
                "Show holder {} does not exist",
                show_holder_id
            )));
        }
        Ok(())
    }
}

/// List all shows
#[utoipa::path(
    get,
    path = "/api/shows",
    tag = "shows",
    responses(
        (status = 200, description = "List of shows", body = Vec<ShowDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shows(
    State(state): State<ShowsState>,
    _auth: Authenticated,
) -> Result<Json<Vec<ShowDto>>, PlatformError> {
    let shows = state.show_repo.find_all().await?;
    Ok(Json(shows.into_iter().map(ShowDto::from).collect()))
}

/// Get show by ID, including divisions and classes
#[utoipa::path(
    get,
    path = "/api/shows/{id}",
    tag = "shows",
    params(
        ("id" = String, Path, description = "Show ID")
    ),
    responses(
        (status = 200, description = "Show found", body = ShowDto),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_show(
    State(state): State<ShowsState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ShowDto>, PlatformError> {
    let show_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Show", &id))?;
    let (show, divisions) = state
        .show_repo
        .find_with_divisions(show_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Show", &id))?;

    Ok(Json(show_dto(show, divisions)))
}

/// List shows assigned to a judge
#[utoipa::path(
    get,
    path = "/api/shows/judge/{judge_id}",
    tag = "shows",
    params(
        ("judge_id" = String, Path, description = "Judge user ID")
    ),
    responses(
        (status = 200, description = "Shows for the judge", body = Vec<ShowDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shows_by_judge(
    State(state): State<ShowsState>,
    _auth: Authenticated,
    Path(judge_id): Path<String>,
) -> Result<Json<Vec<ShowDto>>, PlatformError> {
    let shows = state.show_repo.find_by_judge_id(&judge_id).await?;
    Ok(Json(shows.into_iter().map(ShowDto::from).collect()))
}

/// Create a show
#[utoipa::path(
    post,
    path = "/api/shows",
    tag = "shows",
    request_body = ShowRequest,
    responses(
        (status = 201, description = "Show created", body = ShowDto),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Show management role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_show(
    State(state): State<ShowsState>,
    auth: Authenticated,
    Json(req): Json<ShowRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;
    state.ensure_show_holder_exists(req.show_holder_id).await?;

    let show = Show::from_request(&req)?;
    let id = state.show_repo.insert(&show).await?;
    tracing::info!(show_id = id, user_id = %auth.0.user_id, "Show created");

    let show = state
        .show_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created show could not be reloaded"))?;
    Ok(created(format!("/api/shows/{}", id), ShowDto::from(show)))
}

/// Update a show
#[utoipa::path(
    put,
    path = "/api/shows/{id}",
    tag = "shows",
    params(
        ("id" = String, Path, description = "Show ID")
    ),
    request_body = ShowRequest,
    responses(
        (status = 200, description = "Show updated", body = ShowDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_show(
    State(state): State<ShowsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ShowRequest>,
) -> Result<Json<ShowDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let show_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Show", &id))?;
    if req.id.is_some_and(|body_id| body_id != show_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut show = state
        .show_repo
        .find_by_id(show_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Show", &id))?;

    if req.show_holder_id != show.show_holder_id {
        state.ensure_show_holder_exists(req.show_holder_id).await?;
    }
    show.apply_request(&req)?;
    show.touch();
    state.show_repo.update(&show).await?;

    let show = state
        .show_repo
        .find_by_id(show_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Show", &id))?;
    Ok(Json(show.into()))
}

/// Delete a show
#[utoipa::path(
    delete,
    path = "/api/shows/{id}",
    tag = "shows",
    params(
        ("id" = String, Path, description = "Show ID")
    ),
    responses(
        (status = 204, description = "Show deleted"),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_show(
    State(state): State<ShowsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let deleted = match parse_id(&id) {
        Some(show_id) => state.show_repo.soft_delete(show_id).await?,
        None => false,
    };
    if deleted {
        tracing::info!(show_id = %id, user_id = %auth.0.user_id, "Show deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Show", &id))
    }
}

/// Create shows router
pub fn shows_router(state: ShowsState) -> Router {
    Router::new()
        .route("/", get(list_shows).post(create_show))
        .route("/:id", get(get_show).put(update_show).delete(delete_show))
        .route("/judge/:judge_id", get(list_shows_by_judge))
        .with_state(state)
}
