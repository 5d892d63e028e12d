//! Error Types
//!
//! Centralized error handling for all account and session operations.
//! Responses carry only the coarse-grained kind; full internal detail is
//! logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Account and session errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this handle already exists")]
    DuplicateHandle,

    #[error("Invalid handle or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Admin access required")]
    Forbidden,

    #[error("User not found")]
    NotFound,

    #[error("Registration failed")]
    RegistrationFailed,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Revocation store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::DuplicateHandle => (
                StatusCode::CONFLICT,
                "duplicate_handle",
                self.to_string(),
            ),
            // Absent account and wrong password share one body shape.
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            // Missing, malformed, expired, and revoked tokens all look the
            // same to the caller.
            AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                self.to_string(),
            ),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                self.to_string(),
            ),
            AuthError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                self.to_string(),
            ),
            AuthError::RegistrationFailed => (
                StatusCode::BAD_REQUEST,
                "registration_failed",
                self.to_string(),
            ),
            AuthError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
            ),
            AuthError::StoreUnavailable(_)
            | AuthError::Database(_)
            | AuthError::Config(_)
            | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // The UNIQUE constraint on handle is the authoritative duplicate
        // signal; a violation means a concurrent registration won the race.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AuthError::DuplicateHandle;
            }
        }
        tracing::error!("database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("token verification failed: {:?}", err);
        AuthError::Unauthenticated
    }
}

impl From<deadpool_redis::PoolError> for AuthError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        tracing::error!("revocation store connection error: {:?}", err);
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<deadpool_redis::redis::RedisError> for AuthError {
    fn from(err: deadpool_redis::redis::RedisError) -> Self {
        tracing::error!("revocation store error: {:?}", err);
        AuthError::StoreUnavailable(err.to_string())
    }
}
