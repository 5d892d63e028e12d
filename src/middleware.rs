//! Session Gate Middleware
//!
//! Per-request bearer token validation. Verified claims are stored in
//! request extensions for the `AuthUser` extractor.

use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Extract the bearer token from the Authorization header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Require an authenticated session
///
/// Verifies the token, rejects revoked sessions, and stores the claims in
/// request extensions.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthenticated)?;

    let claims = auth.authenticate(token).await?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Require an authenticated session with the admin role
pub async fn require_admin(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthenticated)?;

    let claims = auth.authenticate(token).await?;

    if claims.role != "admin" {
        return Err(AuthError::Forbidden);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert_eq!(bearer_token(&headers), None);
    }
}
