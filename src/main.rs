//! Service entry point.
//!
//! Initializes logging, loads configuration, connects the account and
//! revocation stores, and serves the router.

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use userbase::{database, AppConfig, AuthService, RevocationStore, UserService};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate().expect("Invalid configuration");

    let db = database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    database::setup_schema(&db)
        .await
        .expect("Failed to set up database schema");

    let revocation = RevocationStore::connect(&config.redis_url, config.token_lifetime)
        .expect("Failed to create revocation store pool");

    let bind_addr = config.bind_addr.clone();
    let auth = Arc::new(AuthService::new(db.clone(), revocation, config));
    let users = Arc::new(UserService::new(db, auth.clone()));

    let app = userbase::create_router(auth, users)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await.expect("server error");
}
