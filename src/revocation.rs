//! Revocation Store
//!
//! Redis-backed adapter recording logged-out tokens. The key is the exact
//! token string presented at logout; the Session Gate rejects any token
//! found here regardless of its remaining lifetime.
//!
//! Records carry a TTL equal to the configured token lifetime: a token
//! older than that is already rejected by its own `exp` claim, so letting
//! the marker lapse afterwards preserves behavior while keeping the store
//! bounded.

use crate::error::AuthError;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};

const REVOKED_MARKER: &str = "revoked";

/// Shared handle to the revocation list, safe for concurrent use
#[derive(Clone)]
pub struct RevocationStore {
    pool: Pool,
    ttl_seconds: i64,
}

impl RevocationStore {
    /// Build the connection pool
    ///
    /// Connections are established lazily on first use.
    pub fn connect(redis_url: &str, ttl_seconds: i64) -> Result<Self, AuthError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self { pool, ttl_seconds })
    }

    /// Record a token as revoked; idempotent
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(token, REVOKED_MARKER, self.ttl_seconds.max(1) as u64)
            .await?;
        Ok(())
    }

    /// Check whether a token has been revoked; a single round trip,
    /// on the hot path of every authenticated request
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let mut conn = self.pool.get().await?;
        let marker: Option<String> = conn.get(token).await?;
        Ok(marker.as_deref() == Some(REVOKED_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_invalid_url() {
        assert!(RevocationStore::connect("not a redis url", 3600).is_err());
    }

    #[test]
    fn test_connect_is_lazy() {
        // No Redis server is required to build the pool.
        assert!(RevocationStore::connect("redis://localhost:6379", 3600).is_ok());
    }
}
