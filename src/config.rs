//! Service Configuration
//!
//! All configuration values are loaded from environment variables once at
//! startup and passed explicitly to the components that need them.

use crate::error::AuthError;
use std::env;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string (from DATABASE_URL env var)
    pub database_url: String,

    /// Redis connection string for the revocation list (from REDIS_URL env var)
    pub redis_url: String,

    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Token lifetime in seconds (from JWT_EXPIRATION env var)
    pub token_lifetime: i64,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Listen address (from BIND_ADDR env var)
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if DATABASE_URL, REDIS_URL, or JWT_SECRET is not set
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL environment variable must be set"),

            redis_url: env::var("REDIS_URL")
                .expect("REDIS_URL environment variable must be set"),

            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET environment variable must be set"),

            token_lifetime: env::var("JWT_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600), // 1 hour default

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.token_lifetime <= 0 {
            return Err(AuthError::Config(
                "JWT_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.argon2_parallelism == 0 {
            return Err(AuthError::Config(
                "ARGON2_PARALLELISM must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/userbase".to_string(),
            redis_url: "redis://localhost".to_string(),
            jwt_secret: "a".repeat(32),
            token_lifetime: 3600,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AppConfig {
            jwt_secret: "short".to_string(),
            ..base_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_lifetime() {
        let config = AppConfig {
            token_lifetime: 0,
            ..base_config()
        };

        assert!(config.validate().is_err());
    }
}
