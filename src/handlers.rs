//! Authentication HTTP Handlers
//!
//! REST endpoints for the register/login/logout cycle.

use crate::error::AuthError;
use crate::middleware::bearer_token;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse};
use crate::service::AuthService;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

/// POST /auth/register
///
/// Create a new account and return its first session token
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let access_token = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { access_token })))
}

/// POST /auth/login
///
/// Authenticate credentials and return a session token
pub async fn login(
    State(auth): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let access_token = auth.login(&req.handle, &req.password).await?;

    Ok(Json(TokenResponse { access_token }))
}

/// POST /auth/logout
///
/// Revoke the presented bearer token; idempotent
pub async fn logout(
    State(auth): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;

    auth.logout(token).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}
