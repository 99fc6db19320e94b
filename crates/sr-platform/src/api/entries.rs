//! Entries API
//!
//! REST endpoints for entering horses into classes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use sr_common::{EntryDto, EntryRequest, ResultDto};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::{Entry, ShowClass, UserModelObject};
use crate::error::PlatformError;
use crate::repository::{EntryRepository, ShowClassRepository, ShowRepository, UserModelObjectRepository};
use crate::service::{checks, AuthContext, Policy};

impl From<Entry> for EntryDto {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            entry_number: e.entry_number,
            submission_date: e.submission_date,
            status: e.status.to_string(),
            user_model_object_id: e.user_model_object_id,
            horse_name: e.horse_name.unwrap_or_default(),
            show_class_id: e.show_class_id,
            result: e.result.map(ResultDto::from),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Query parameters for the entries list; one filter is required
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EntriesQuery {
    pub show_class_id: Option<String>,
    pub user_model_object_id: Option<String>,
}

/// Entries service state
#[derive(Clone)]
pub struct EntriesState {
    pub entry_repo: Arc<EntryRepository>,
    pub class_repo: Arc<ShowClassRepository>,
    pub show_repo: Arc<ShowRepository>,
    pub horse_repo: Arc<UserModelObjectRepository>,
}

impl EntriesState {
    /// Load the horse and check the caller may enter it.
    async fn owned_horse(&self, ctx: &AuthContext, horse_id: i64) -> Result<UserModelObject, PlatformError> {
        let horse = self
            .horse_repo
            .find_by_id(horse_id)
            .await?
            .ok_or_else(|| PlatformError::validation(format!("Horse {} does not exist", horse_id)))?;
        checks::require_owner_or_admin(ctx, horse.application_user_id.as_deref())?;
        Ok(horse)
    }

    /// Class capacity, the show's entry window and the owner's per-show limit.
    ///
    /// `moving` is the entry being moved or re-horsed; it is left out of both
    /// counts. Admins are not bound by the entry window.
    async fn ensure_can_enter(
        &self,
        ctx: &AuthContext,
        horse: &UserModelObject,
        class_id: i64,
        moving: Option<i64>,
    ) -> Result<ShowClass, PlatformError> {
        let class = self
            .class_repo
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| PlatformError::validation(format!("Class {} does not exist", class_id)))?;

        let current = self.class_repo.count_entries(class.id, moving).await?;
        if !class.has_capacity_for(current) {
            return Err(PlatformError::validation(format!(
                "Class {} is full ({} entries)",
                class.name, current
            )));
        }

        let show = self
            .show_repo
            .find_by_id(class.show_id)
            .await?
            .ok_or_else(|| PlatformError::validation(format!("Show {} does not exist", class.show_id)))?;
        if !ctx.is_admin() && !show.accepts_entries_at(Utc::now()) {
            return Err(PlatformError::validation(format!(
                "Show {} is not accepting entries",
                show.name
            )));
        }

        if let Some(owner) = horse.application_user_id.as_deref() {
            let owned = self
                .entry_repo
                .count_for_owner_in_show(owner, show.id, moving)
                .await?;
            if owned >= i64::from(show.max_entries_per_user) {
                return Err(PlatformError::validation(format!(
                    "At most {} entries per user are allowed in {}",
                    show.max_entries_per_user, show.name
                )));
            }
        }
        Ok(class)
    }
}

/// List entries of a class or of a horse
#[utoipa::path(
    get,
    path = "/api/entries",
    tag = "entries",
    params(EntriesQuery),
    responses(
        (status = 200, description = "Entries with horse names and results", body = Vec<EntryDto>),
        (status = 400, description = "Neither showClassId nor userModelObjectId given")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_entries(
    State(state): State<EntriesState>,
    _auth: Authenticated,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<EntryDto>>, PlatformError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let entries = if let Some(class_id) = non_blank(query.show_class_id) {
        match parse_id(&class_id) {
            Some(id) => state.entry_repo.find_by_show_class_id(id).await?,
            None => Vec::new(),
        }
    } else if let Some(horse_id) = non_blank(query.user_model_object_id) {
        match parse_id(&horse_id) {
            Some(id) => state.entry_repo.find_by_user_model_object_id(id).await?,
            None => Vec::new(),
        }
    } else {
        return Err(PlatformError::validation(
            "Either the 'showClassId' or the 'userModelObjectId' parameter is required.",
        ));
    };

    Ok(Json(entries.into_iter().map(EntryDto::from).collect()))
}

/// Get entry by ID
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    tag = "entries",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = EntryDto),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_entry(
    State(state): State<EntriesState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<EntryDto>, PlatformError> {
    let entry_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Entry", &id))?;
    let entry = state
        .entry_repo
        .find_by_id(entry_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Entry", &id))?;

    Ok(Json(entry.into()))
}

/// Enter a horse into a class
#[utoipa::path(
    post,
    path = "/api/entries",
    tag = "entries",
    request_body = EntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryDto),
        (status = 400, description = "Validation error, full class or closed show"),
        (status = 403, description = "Horse belongs to another user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_entry(
    State(state): State<EntriesState>,
    auth: Authenticated,
    Json(req): Json<EntryRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireUserRole)?;

    let entry = Entry::from_request(&req)?;
    let horse = state.owned_horse(&auth.0, req.user_model_object_id).await?;
    let class = state.ensure_can_enter(&auth.0, &horse, req.show_class_id, None).await?;

    let id = state
        .entry_repo
        .insert_within_capacity(&entry, class.max_entries)
        .await?
        .ok_or_else(|| PlatformError::validation(format!("Class {} is full", class.name)))?;
    tracing::info!(entry_id = id, class_id = req.show_class_id, horse_id = horse.id, "Entry created");

    let entry = state
        .entry_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created entry could not be reloaded"))?;
    Ok(created(format!("/api/entries/{}", id), EntryDto::from(entry)))
}

/// Update an entry
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    tag = "entries",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    request_body = EntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 403, description = "Horse belongs to another user"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_entry(
    State(state): State<EntriesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<EntryDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireUserRole)?;

    let entry_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Entry", &id))?;
    if req.id.is_some_and(|body_id| body_id != entry_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut entry = state
        .entry_repo
        .find_by_id(entry_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Entry", &id))?;

    let current_horse = state.owned_horse(&auth.0, entry.user_model_object_id).await?;
    let horse = if req.user_model_object_id != entry.user_model_object_id {
        state.owned_horse(&auth.0, req.user_model_object_id).await?
    } else {
        current_horse
    };

    // moving to another class or horse counts as a new entry there
    if req.show_class_id != entry.show_class_id || horse.id != entry.user_model_object_id {
        state
            .ensure_can_enter(&auth.0, &horse, req.show_class_id, Some(entry.id))
            .await?;
    }

    entry.apply_request(&req)?;
    entry.touch();
    state.entry_repo.update(&entry).await?;

    let entry = state
        .entry_repo
        .find_by_id(entry_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Entry", &id))?;
    Ok(Json(entry.into()))
}

/// Withdraw an entry
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    tag = "entries",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Horse belongs to another user"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<EntriesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireUserRole)?;

    let entry = match parse_id(&id) {
        Some(entry_id) => state.entry_repo.find_by_id(entry_id).await?,
        None => None,
    };
    let entry = entry.ok_or_else(|| PlatformError::not_found("Entry", &id))?;

    if let Some(horse) = state.horse_repo.find_by_id(entry.user_model_object_id).await? {
        checks::require_owner_or_admin(&auth.0, horse.application_user_id.as_deref())?;
    } else {
        checks::require_admin(&auth.0)?;
    }

    if state.entry_repo.soft_delete(entry.id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Entry", &id))
    }
}

/// Create entries router
pub fn entries_router(state: EntriesState) -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", get(get_entry).put(update_entry).delete(delete_entry))
        .with_state(state)
}
