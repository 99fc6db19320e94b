//! API Middleware
//!
//! Authentication extractors for Axum handlers.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::common::ApiError;
use crate::service::{extract_bearer_token, AuthContext, AuthService, AuthorizationService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub authz_service: Arc<AuthorizationService>,
}

fn unauthorized(message: &str) -> Response {
    ApiError::new("UNAUTHORIZED", message).into_response_with(StatusCode::UNAUTHORIZED)
}

/// Extractor for authenticated requests
/// Validates the JWT and loads the caller's current roles
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| {
            ApiError::new("INTERNAL_ERROR", "AppState not found")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

        let claims = app_state
            .auth_service
            .validate_token(token)
            .map_err(|e| e.into_response())?;

        let context = app_state
            .authz_service
            .build_context(&claims)
            .await
            .map_err(|e| e.into_response())?;

        Ok(Authenticated(context))
    }
}

/// Extractor for optionally authenticated requests
pub struct OptionalAuth(pub Option<AuthContext>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuth(None));
        }
        Ok(OptionalAuth(
            Authenticated::from_request_parts(parts, state).await.ok().map(|a| a.0),
        ))
    }
}
