//! Show Classes API
//!
//! REST endpoints for the judged classes within divisions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sr_common::{ShowClassDto, ShowClassRequest};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::ShowClass;
use crate::error::PlatformError;
use crate::repository::{DivisionRepository, ShowClassRepository};
use crate::service::{checks, Policy};

fn name_of<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

impl From<ShowClass> for ShowClassDto {
    fn from(c: ShowClass) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            class_number: c.class_number,
            max_entries: c.max_entries,
            sort_order: c.sort_order,
            breed_category: name_of(c.breed_category),
            finish_type: name_of(c.finish_type),
            performance_type: name_of(c.performance_type),
            collectibility_type: name_of(c.collectibility_type),
            gender_restriction: name_of(c.gender_restriction),
            age_restriction: name_of(c.age_restriction),
            color_restriction: name_of(c.color_restriction),
            scale_restriction: name_of(c.scale_restriction),
            division_id: c.division_id,
            division_name: c.division_name.unwrap_or_default(),
            show_id: c.show_id,
            show_name: c.show_name.unwrap_or_default(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query parameters for the classes list; one filter is required
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShowClassesQuery {
    pub show_id: Option<String>,
    pub division_id: Option<String>,
}

/// Show classes service state
#[derive(Clone)]
pub struct ShowClassesState {
    pub class_repo: Arc<ShowClassRepository>,
    pub division_repo: Arc<DivisionRepository>,
}

impl ShowClassesState {
    /// The division must exist and belong to the class's show.
    async fn ensure_division_in_show(&self, division_id: i64, show_id: i64) -> Result<(), PlatformError> {
        let division = self
            .division_repo
            .find_by_id(division_id)
            .await?
            .ok_or_else(|| PlatformError::validation(format!("Division {} does not exist", division_id)))?;
        if division.show_id != show_id {
            return Err(PlatformError::validation(format!(
                "Division {} does not belong to show {}",
                division_id, show_id
            )));
        }
        Ok(())
    }
}

/// List classes of a show or a division
#[utoipa::path(
    get,
    path = "/api/showclasses",
    tag = "show-classes",
    params(ShowClassesQuery),
    responses(
        (status = 200, description = "Classes ordered by sort order then class number", body = Vec<ShowClassDto>),
        (status = 400, description = "Neither showId nor divisionId given")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_show_classes(
    State(state): State<ShowClassesState>,
    _auth: Authenticated,
    Query(query): Query<ShowClassesQuery>,
) -> Result<Json<Vec<ShowClassDto>>, PlatformError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let classes = if let Some(division_id) = non_blank(query.division_id) {
        match parse_id(&division_id) {
            Some(id) => state.class_repo.find_by_division_id(id).await?,
            None => Vec::new(),
        }
    } else if let Some(show_id) = non_blank(query.show_id) {
        match parse_id(&show_id) {
            Some(id) => state.class_repo.find_by_show_id(id).await?,
            None => Vec::new(),
        }
    } else {
        return Err(PlatformError::validation(
            "Either the 'showId' or the 'divisionId' parameter is required.",
        ));
    };

    Ok(Json(classes.into_iter().map(ShowClassDto::from).collect()))
}

/// Get class by ID
#[utoipa::path(
    get,
    path = "/api/showclasses/{id}",
    tag = "show-classes",
    params(
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class found", body = ShowClassDto),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_show_class(
    State(state): State<ShowClassesState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ShowClassDto>, PlatformError> {
    let class_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("ShowClass", &id))?;
    let class = state
        .class_repo
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("ShowClass", &id))?;

    Ok(Json(class.into()))
}

/// Create a class
#[utoipa::path(
    post,
    path = "/api/showclasses",
    tag = "show-classes",
    request_body = ShowClassRequest,
    responses(
        (status = 201, description = "Class created", body = ShowClassDto),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_show_class(
    State(state): State<ShowClassesState>,
    auth: Authenticated,
    Json(req): Json<ShowClassRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let class = ShowClass::from_request(&req)?;
    state.ensure_division_in_show(req.division_id, req.show_id).await?;
    let id = state.class_repo.insert(&class).await?;

    let class = state
        .class_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created class could not be reloaded"))?;
    Ok(created(format!("/api/showclasses/{}", id), ShowClassDto::from(class)))
}

/// Update a class
#[utoipa::path(
    put,
    path = "/api/showclasses/{id}",
    tag = "show-classes",
    params(
        ("id" = String, Path, description = "Class ID")
    ),
    request_body = ShowClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ShowClassDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_show_class(
    State(state): State<ShowClassesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ShowClassRequest>,
) -> Result<Json<ShowClassDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let class_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("ShowClass", &id))?;
    if req.id.is_some_and(|body_id| body_id != class_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut class = state
        .class_repo
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("ShowClass", &id))?;

    class.apply_request(&req)?;
    state.ensure_division_in_show(req.division_id, req.show_id).await?;
    class.touch();
    state.class_repo.update(&class).await?;

    let class = state
        .class_repo
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("ShowClass", &id))?;
    Ok(Json(class.into()))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/api/showclasses/{id}",
    tag = "show-classes",
    params(
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_show_class(
    State(state): State<ShowClassesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireShowManagementRole)?;

    let deleted = match parse_id(&id) {
        Some(class_id) => state.class_repo.soft_delete(class_id).await?,
        None => false,
    };
    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("ShowClass", &id))
    }
}

/// Create show classes router
pub fn show_classes_router(state: ShowClassesState) -> Router {
    Router::new()
        .route("/", get(list_show_classes).post(create_show_class))
        .route("/:id", get(get_show_class).put(update_show_class).delete(delete_show_class))
        .with_state(state)
}
