//! Userbase Account Service
//!
//! A user account service built around a register/login/logout/validate
//! session cycle:
//! - Account registration with store-enforced handle uniqueness
//! - Login with Argon2id password verification
//! - JWT bearer sessions signed with a shared secret
//! - Logout via a Redis revocation list checked on every authenticated request
//! - Profile retrieval and update for the authenticated user
//! - Admin-only user listing (paginated, filtered, sorted) and removal
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `DATABASE_URL` - PostgreSQL connection string (required)
//! - `REDIS_URL` - Redis connection string for the revocation list (required)
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_EXPIRATION` - Token lifetime in seconds (default: 3600)
//! - `ARGON2_MEMORY_COST` - Argon2 memory cost in KiB (default: 65536)
//! - `ARGON2_TIME_COST` - Argon2 iterations (default: 3)
//! - `ARGON2_PARALLELISM` - Argon2 lanes (default: 4)
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0:3000)
//!
//! # Usage
//!
//! ```rust,ignore
//! use userbase::{AppConfig, AuthService, RevocationStore, UserService};
//!
//! let config = AppConfig::from_env();
//! config.validate()?;
//!
//! let db = userbase::database::connect(&config.database_url).await?;
//! let revocation = RevocationStore::connect(&config.redis_url, config.token_lifetime)?;
//! let auth = Arc::new(AuthService::new(db.clone(), revocation, config));
//! let users = Arc::new(UserService::new(db, auth.clone()));
//! let app = userbase::create_router(auth, users);
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod revocation;
pub mod service;
pub mod users;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use handlers::AuthState;
pub use models::*;
pub use revocation::RevocationStore;
pub use service::AuthService;
pub use users::{UserService, UsersState};

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Create the service router.
///
/// Auth endpoints are public; `/users/me` runs behind the session gate and
/// the administrative endpoints additionally require the admin role.
pub fn create_router(auth: Arc<AuthService>, users: Arc<UserService>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .with_state(auth.clone());

    let profile_routes = Router::new()
        .route(
            "/users/me",
            get(users::get_me).patch(users::update_me),
        )
        .layer(axum_middleware::from_fn_with_state(
            auth.clone(),
            middleware::require_auth,
        ))
        .with_state(users.clone());

    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:id", delete(users::remove_user))
        .layer(axum_middleware::from_fn_with_state(
            auth,
            middleware::require_admin,
        ))
        .with_state(users);

    Router::new()
        .merge(auth_routes)
        .merge(profile_routes)
        .merge(admin_routes)
}
