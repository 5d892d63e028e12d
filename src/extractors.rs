//! Identity Extractors
//!
//! Axum extractor producing the identity context for handlers running
//! behind the session gate.

use crate::error::AuthError;
use crate::models::Claims;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Identity context of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub handle: String,
    pub role: String,
}

impl AuthUser {
    /// Build the identity context from verified token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            handle: claims.username.clone(),
            role: claims.role.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Claims are placed here by the session gate middleware; a route
        // without the gate has no identity to offer.
        parts
            .extensions
            .get::<Claims>()
            .map(AuthUser::from_claims)
            .ok_or(AuthError::Unauthenticated)
    }
}
