//! Model Horses API
//!
//! REST endpoints for competitors' model horses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sr_common::{UserModelObjectDto, UserModelObjectRequest};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::UserModelObject;
use crate::error::PlatformError;
use crate::repository::UserModelObjectRepository;
use crate::service::checks;

impl From<UserModelObject> for UserModelObjectDto {
    fn from(h: UserModelObject) -> Self {
        let hero_shot_image = h.hero_shot_base64();
        Self {
            id: h.id,
            tw_entry_id: h.tw_entry_id,
            name: h.name,
            description: h.description,
            application_user_id: h.application_user_id,
            color: h.color,
            size: h.size,
            class: h.class,
            breed: h.breed,
            notes: h.notes,
            hero_shot_image,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

/// Query parameters for the horse list
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserModelObjectsQuery {
    /// Owner whose horses to list (required)
    pub application_user_id: Option<String>,
}

/// Model horses service state
#[derive(Clone)]
pub struct UserModelObjectsState {
    pub horse_repo: Arc<UserModelObjectRepository>,
}

/// List a user's horses
#[utoipa::path(
    get,
    path = "/api/userModelObjects",
    tag = "user-model-objects",
    params(UserModelObjectsQuery),
    responses(
        (status = 200, description = "Horses owned by the user", body = Vec<UserModelObjectDto>),
        (status = 400, description = "applicationUserId missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_user_model_objects(
    State(state): State<UserModelObjectsState>,
    _auth: Authenticated,
    Query(query): Query<UserModelObjectsQuery>,
) -> Result<Json<Vec<UserModelObjectDto>>, PlatformError> {
    let owner = query
        .application_user_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PlatformError::validation("The 'applicationUserId' parameter is required."))?;

    let horses = state.horse_repo.find_by_user(&owner).await?;
    Ok(Json(horses.into_iter().map(UserModelObjectDto::from).collect()))
}

/// Get horse by ID
#[utoipa::path(
    get,
    path = "/api/userModelObjects/{id}",
    tag = "user-model-objects",
    params(
        ("id" = String, Path, description = "Horse ID")
    ),
    responses(
        (status = 200, description = "Horse found", body = UserModelObjectDto),
        (status = 404, description = "Horse not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_model_object(
    State(state): State<UserModelObjectsState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserModelObjectDto>, PlatformError> {
    let horse_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("UserModelObject", &id))?;
    let horse = state
        .horse_repo
        .find_by_id(horse_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("UserModelObject", &id))?;

    Ok(Json(horse.into()))
}

/// Register a horse owned by the caller
#[utoipa::path(
    post,
    path = "/api/userModelObjects",
    tag = "user-model-objects",
    request_body = UserModelObjectRequest,
    responses(
        (status = 201, description = "Horse created", body = UserModelObjectDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user_model_object(
    State(state): State<UserModelObjectsState>,
    auth: Authenticated,
    Json(req): Json<UserModelObjectRequest>,
) -> Result<Response, PlatformError> {
    let horse = UserModelObject::from_request(&req, &auth.0.user_id)?;
    let id = state.horse_repo.insert(&horse).await?;

    let horse = state
        .horse_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created horse could not be reloaded"))?;
    Ok(created(format!("/api/userModelObjects/{}", id), UserModelObjectDto::from(horse)))
}

/// Update a horse
#[utoipa::path(
    put,
    path = "/api/userModelObjects/{id}",
    tag = "user-model-objects",
    params(
        ("id" = String, Path, description = "Horse ID")
    ),
    request_body = UserModelObjectRequest,
    responses(
        (status = 200, description = "Horse updated", body = UserModelObjectDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Horse not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_model_object(
    State(state): State<UserModelObjectsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UserModelObjectRequest>,
) -> Result<Json<UserModelObjectDto>, PlatformError> {
    let horse_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("UserModelObject", &id))?;
    if req.id.is_some_and(|body_id| body_id != horse_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut horse = state
        .horse_repo
        .find_by_id(horse_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("UserModelObject", &id))?;
    checks::require_owner_or_admin(&auth.0, horse.application_user_id.as_deref())?;

    horse.apply_request(&req)?;
    horse.touch();
    state.horse_repo.update(&horse).await?;

    Ok(Json(horse.into()))
}

/// Delete a horse
#[utoipa::path(
    delete,
    path = "/api/userModelObjects/{id}",
    tag = "user-model-objects",
    params(
        ("id" = String, Path, description = "Horse ID")
    ),
    responses(
        (status = 204, description = "Horse deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Horse not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user_model_object(
    State(state): State<UserModelObjectsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    let horse = match parse_id(&id) {
        Some(horse_id) => state.horse_repo.find_by_id(horse_id).await?,
        None => None,
    };
    let horse = horse.ok_or_else(|| PlatformError::not_found("UserModelObject", &id))?;
    checks::require_owner_or_admin(&auth.0, horse.application_user_id.as_deref())?;

    if state.horse_repo.soft_delete(horse.id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("UserModelObject", &id))
    }
}

/// Create model horses router
pub fn user_model_objects_router(state: UserModelObjectsState) -> Router {
    Router::new()
        .route("/", get(list_user_model_objects).post(create_user_model_object))
        .route(
            "/:id",
            get(get_user_model_object)
                .put(update_user_model_object)
                .delete(delete_user_model_object),
        )
        .with_state(state)
}
