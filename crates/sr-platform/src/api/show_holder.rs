//! Show Holder API
//!
//! Show management limited to the caller's own shows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use sr_common::{ShowDto, ShowRequest};
use std::sync::Arc;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::error::PlatformError;
use crate::service::{checks, Policy, ShowHolderService};

/// Show holder service state
#[derive(Clone)]
pub struct ShowHolderState {
    pub show_holder_service: Arc<ShowHolderService>,
}

/// List the caller's shows
///
/// Admins see every show.
#[utoipa::path(
    get,
    path = "/api/showholder/shows",
    tag = "show-holder",
    responses(
        (status = 200, description = "Shows owned by the caller", body = Vec<ShowDto>),
        (status = 403, description = "Show management role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_shows(
    State(state): State<ShowHolderState>,
    auth: Authenticated,
) -> Result<Json<Vec<ShowDto>>, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;
    let shows = state.show_holder_service.my_shows(&auth.0).await?;
    Ok(Json(shows.into_iter().map(ShowDto::from).collect()))
}

/// Create a show for a show-holder record the caller owns
#[utoipa::path(
    post,
    path = "/api/showholder/shows",
    tag = "show-holder",
    request_body = ShowRequest,
    responses(
        (status = 201, description = "Show created", body = ShowDto),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller does not own the show holder")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_my_show(
    State(state): State<ShowHolderState>,
    auth: Authenticated,
    Json(req): Json<ShowRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;
    let show = state.show_holder_service.create(&auth.0, &req).await?;
    Ok(created(format!("/api/shows/{}", show.id), ShowDto::from(show)))
}

/// Update one of the caller's shows
#[utoipa::path(
    put,
    path = "/api/showholder/shows/{id}",
    tag = "show-holder",
    params(
        ("id" = String, Path, description = "Show ID")
    ),
    request_body = ShowRequest,
    responses(
        (status = 200, description = "Show updated", body = ShowDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 403, description = "Caller does not own the show"),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_my_show(
    State(state): State<ShowHolderState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ShowRequest>,
) -> Result<Json<ShowDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let show_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Show", &id))?;
    if req.id.is_some_and(|body_id| body_id != show_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let show = state.show_holder_service.update(&auth.0, show_id, &req).await?;
    Ok(Json(show.into()))
}

/// Delete one of the caller's shows
#[utoipa::path(
    delete,
    path = "/api/showholder/shows/{id}",
    tag = "show-holder",
    params(
        ("id" = String, Path, description = "Show ID")
    ),
    responses(
        (status = 204, description = "Show deleted"),
        (status = 403, description = "Caller does not own the show"),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_my_show(
    State(state): State<ShowHolderState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let deleted = match parse_id(&id) {
        Some(show_id) => state.show_holder_service.delete(&auth.0, show_id).await?,
        None => false,
    };
    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Show", &id))
    }
}

/// Create show holder router
pub fn show_holder_router(state: ShowHolderState) -> Router {
    Router::new()
        .route("/shows", get(my_shows).post(create_my_show))
        .route("/shows/:id", put(update_my_show).delete(delete_my_show))
        .with_state(state)
}
