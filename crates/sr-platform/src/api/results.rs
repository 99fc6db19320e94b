//! Results API
//!
//! Judged placements. Each entry has at most one live result.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sr_common::{ResultDto, ResultRequest};
use std::sync::Arc;

use crate::api::common::{created, parse_id};
use crate::api::middleware::Authenticated;
use crate::domain::ShowResult;
use crate::error::PlatformError;
use crate::repository::{EntryRepository, ResultRepository};
use crate::service::{checks, Policy};

impl From<ShowResult> for ResultDto {
    fn from(r: ShowResult) -> Self {
        Self {
            id: r.id,
            placement: r.placement,
            comments: r.comments,
            judged_date: r.judged_date,
            entry_id: r.entry_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Results service state
#[derive(Clone)]
pub struct ResultsState {
    pub result_repo: Arc<ResultRepository>,
    pub entry_repo: Arc<EntryRepository>,
}

impl ResultsState {
    /// The entry must exist and not already carry another result.
    async fn ensure_entry_open(&self, entry_id: i64, current: Option<i64>) -> Result<(), PlatformError> {
        if self.entry_repo.find_by_id(entry_id).await?.is_none() {
            return Err(PlatformError::validation(format!("Entry {} does not exist", entry_id)));
        }
        if let Some(existing) = self.result_repo.find_by_entry_id(entry_id).await? {
            if Some(existing.id) != current {
                return Err(PlatformError::duplicate("Result", "entryId", entry_id.to_string()));
            }
        }
        Ok(())
    }
}

/// Get result by ID
#[utoipa::path(
    get,
    path = "/api/results/{id}",
    tag = "results",
    params(
        ("id" = String, Path, description = "Result ID")
    ),
    responses(
        (status = 200, description = "Result found", body = ResultDto),
        (status = 404, description = "Result not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_result(
    State(state): State<ResultsState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ResultDto>, PlatformError> {
    let result_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Result", &id))?;
    let result = state
        .result_repo
        .find_by_id(result_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Result", &id))?;

    Ok(Json(result.into()))
}

/// Get the result of an entry
#[utoipa::path(
    get,
    path = "/api/results/entry/{entry_id}",
    tag = "results",
    params(
        ("entry_id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Result found", body = ResultDto),
        (status = 404, description = "Entry has no result")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_result_for_entry(
    State(state): State<ResultsState>,
    _auth: Authenticated,
    Path(entry_id): Path<String>,
) -> Result<Json<ResultDto>, PlatformError> {
    let id = parse_id(&entry_id).ok_or_else(|| PlatformError::not_found("Result", &entry_id))?;
    let result = state
        .result_repo
        .find_by_entry_id(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Result", &entry_id))?;

    Ok(Json(result.into()))
}

/// Record a result
#[utoipa::path(
    post,
    path = "/api/results",
    tag = "results",
    request_body = ResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ResultDto),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Judge role required"),
        (status = 409, description = "Entry already has a result")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_result(
    State(state): State<ResultsState>,
    auth: Authenticated,
    Json(req): Json<ResultRequest>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireJudgeRole)?;

    let result = ShowResult::from_request(&req)?;
    state.ensure_entry_open(req.entry_id, None).await?;
    let id = state.result_repo.insert(&result).await?;
    tracing::info!(result_id = id, entry_id = req.entry_id, judge = %auth.0.user_id, "Result recorded");

    let result = state
        .result_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::internal("Created result could not be reloaded"))?;
    Ok(created(format!("/api/results/{}", id), ResultDto::from(result)))
}

/// Update a result
#[utoipa::path(
    put,
    path = "/api/results/{id}",
    tag = "results",
    params(
        ("id" = String, Path, description = "Result ID")
    ),
    request_body = ResultRequest,
    responses(
        (status = 200, description = "Result updated", body = ResultDto),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 404, description = "Result not found"),
        (status = 409, description = "Target entry already has a result")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_result(
    State(state): State<ResultsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ResultRequest>,
) -> Result<Json<ResultDto>, PlatformError> {
    checks::require(&auth.0, Policy::RequireJudgeRole)?;

    let result_id = parse_id(&id).ok_or_else(|| PlatformError::not_found("Result", &id))?;
    if req.id.is_some_and(|body_id| body_id != result_id) {
        return Err(PlatformError::validation("ID mismatch"));
    }

    let mut result = state
        .result_repo
        .find_by_id(result_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Result", &id))?;

    result.apply_request(&req)?;
    state.ensure_entry_open(req.entry_id, Some(result_id)).await?;
    result.touch();
    state.result_repo.update(&result).await?;

    Ok(Json(result.into()))
}

/// Delete a result
#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    tag = "results",
    params(
        ("id" = String, Path, description = "Result ID")
    ),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 404, description = "Result not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_result(
    State(state): State<ResultsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response, PlatformError> {
    checks::require(&auth.0, Policy::RequireJudgeRole)?;

    let deleted = match parse_id(&id) {
        Some(result_id) => state.result_repo.soft_delete(result_id).await?,
        None => false,
    };
    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(PlatformError::not_found("Result", &id))
    }
}

/// Create results router
pub fn results_router(state: ResultsState) -> Router {
    Router::new()
        .route("/", post(create_result))
        .route("/:id", get(get_result).put(update_result).delete(delete_result))
        .route("/entry/:entry_id", get(get_result_for_entry))
        .with_state(state)
}
