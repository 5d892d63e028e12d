//! Database Setup
//!
//! Pool construction and idempotent schema setup for the account store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to the account store
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Create the account schema if it does not exist
///
/// The UNIQUE constraint on handle is the authoritative uniqueness
/// arbiter for concurrent registrations.
pub async fn setup_schema(db: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Setting up account store schema");

    sqlx::query(
        r#"
        DO $$ BEGIN
            CREATE TYPE user_role AS ENUM ('admin', 'user');
        EXCEPTION
            WHEN duplicate_object THEN null;
        END $$;
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            handle TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role user_role NOT NULL,
            name VARCHAR(100),
            address TEXT,
            comment TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);")
        .execute(db)
        .await?;

    tracing::info!("Account store schema ready");
    Ok(())
}
