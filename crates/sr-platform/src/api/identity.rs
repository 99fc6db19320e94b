//! Identity API Endpoints
//!
//! Bearer-token identity endpoints used by web and mobile clients.
//! - POST /identity/register - Create an account
//! - POST /identity/login - Password login, returns access and refresh tokens
//! - POST /identity/refresh - Rotate a refresh token
//! - POST /identity/logout - Revoke the caller's refresh tokens
//! - GET /identity/me - Current user info

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sr_common::{LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, UserInfo};
use std::sync::Arc;

use crate::api::common::CreatedResponse;
use crate::api::middleware::{Authenticated, OptionalAuth};
use crate::error::PlatformError;
use crate::service::IdentityService;

/// Identity service state
#[derive(Clone)]
pub struct IdentityState {
    pub identity_service: Arc<IdentityService>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/identity/register",
    tag = "identity",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = CreatedResponse),
        (status = 400, description = "Invalid email or weak password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<IdentityState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, PlatformError> {
    let user = state.identity_service.register(&req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(user.id))).into_response())
}

/// Password login
#[utoipa::path(
    post,
    path = "/identity/login",
    tag = "identity",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or locked account")
    )
)]
pub async fn login(
    State(state): State<IdentityState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    Ok(Json(state.identity_service.login(&req).await?))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/identity/refresh",
    tag = "identity",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = LoginResponse),
        (status = 401, description = "Refresh token invalid, expired or already used")
    )
)]
pub async fn refresh(
    State(state): State<IdentityState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    Ok(Json(state.identity_service.refresh(&req.refresh_token).await?))
}

/// Logout
///
/// Always succeeds; refresh tokens are revoked when the caller is authenticated.
#[utoipa::path(
    post,
    path = "/identity/logout",
    tag = "identity",
    responses(
        (status = 204, description = "Logged out")
    )
)]
pub async fn logout(
    State(state): State<IdentityState>,
    auth: OptionalAuth,
) -> Result<StatusCode, PlatformError> {
    if let Some(ctx) = auth.0 {
        state.identity_service.logout(&ctx.user_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Current user info
#[utoipa::path(
    get,
    path = "/identity/me",
    tag = "identity",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<IdentityState>,
    auth: Authenticated,
) -> Result<Json<UserInfo>, PlatformError> {
    Ok(Json(state.identity_service.user_info(&auth.0.user_id).await?))
}

/// Create identity router
pub fn identity_router(state: IdentityState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}
