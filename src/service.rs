//! Authentication Service
//!
//! Core account and session logic: password hashing, token issuance and
//! verification, and the register/login/logout/authenticate workflows.

use crate::config::AppConfig;
use crate::error::AuthError;
use crate::models::{Claims, RegisterRequest, User};
use crate::revocation::RevocationStore;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

/// Authentication service
pub struct AuthService {
    db: PgPool,
    revocation: RevocationStore,
    config: AppConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(db: PgPool, revocation: RevocationStore, config: AppConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            db,
            revocation,
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Get reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password using Argon2id
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.argon2_memory_cost,
            self.config.argon2_time_cost,
            self.config.argon2_parallelism,
            None,
        )
        .map_err(|_| AuthError::Internal)?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored hash
    ///
    /// A malformed stored hash counts as a verification failure.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::warn!("stored credential hash is malformed");
            return false;
        };

        let Ok(params) = Params::new(
            self.config.argon2_memory_cost,
            self.config.argon2_time_cost,
            self.config.argon2_parallelism,
            None,
        ) else {
            return false;
        };

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    // ============================================
    // Token Issuance / Verification
    // ============================================

    /// Issue a session token for an account
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.token_lifetime);

        let claims = Claims {
            sub: user.id,
            username: user.handle.clone(),
            role: user.role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a session token's signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new account and issue its first session token
    ///
    /// Fails with `DuplicateHandle` when the handle is taken; any other
    /// mid-flight failure rolls the transaction back and surfaces as
    /// `RegistrationFailed`.
    pub async fn register(&self, req: RegisterRequest) -> Result<String, AuthError> {
        tracing::info!(handle = %req.handle, "registering new account");

        match self.register_in_tx(req).await {
            Ok(token) => Ok(token),
            Err(AuthError::DuplicateHandle) => Err(AuthError::DuplicateHandle),
            Err(err) => {
                tracing::error!(error = %err, "registration failed");
                Err(AuthError::RegistrationFailed)
            }
        }
    }

    async fn register_in_tx(&self, req: RegisterRequest) -> Result<String, AuthError> {
        // Dropping the transaction without a commit rolls it back, which
        // covers every early-exit path below, including caller disconnect.
        let mut tx = self.db.begin().await?;

        // Fast path only: the UNIQUE constraint on handle is the real
        // arbiter, and surfaces a concurrent duplicate at insert time.
        let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE handle = $1")
            .bind(&req.handle)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            tracing::warn!(handle = %req.handle, "handle already taken");
            return Err(AuthError::DuplicateHandle);
        }

        let password_hash = self.hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (handle, password_hash, role, name, address, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&req.handle)
        .bind(&password_hash)
        .bind(&req.role)
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.comment)
        .fetch_one(&mut *tx)
        .await?;

        let token = self.issue_token(&user)?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, handle = %user.handle, "account registered");
        Ok(token)
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Authenticate credentials and issue a session token
    pub async fn login(&self, handle: &str, password: &str) -> Result<String, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE handle = $1")
            .bind(handle)
            .fetch_optional(&self.db)
            .await?;

        // Absent account and wrong password are indistinguishable to the
        // caller.
        let Some(user) = user else {
            tracing::warn!(handle = %handle, "login attempt failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash) {
            tracing::warn!(handle = %handle, "login attempt failed");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;

        tracing::info!(user_id = user.id, handle = %user.handle, "login succeeded");
        Ok(token)
    }

    /// Revoke a session token; idempotent
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.revocation.revoke(token).await?;
        tracing::info!("session token revoked");
        Ok(())
    }

    // ============================================
    // Session Gate
    // ============================================

    /// Validate a bearer token and produce its identity claims
    ///
    /// Rejects tokens with a bad signature, elapsed expiry, or a revocation
    /// record, all as `Unauthenticated`.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;

        if self.revocation.is_revoked(token).await? {
            tracing::debug!(sub = claims.sub, "rejected token revoked by logout");
            return Err(AuthError::Unauthenticated);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use sqlx::postgres::PgPoolOptions;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/userbase_test".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_lifetime: 3600,
            // Minimal Argon2 parameters keep the hashing tests fast.
            argon2_memory_cost: 8192,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }

    fn test_service(config: AppConfig) -> AuthService {
        // Both pools connect lazily; pure credential and token operations
        // never touch the stores.
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let revocation =
            RevocationStore::connect(&config.redis_url, config.token_lifetime).expect("pool");
        AuthService::new(db, revocation, config)
    }

    fn test_user(role: UserRole) -> User {
        User {
            id: 42,
            handle: "alice".to_string(),
            password_hash: String::new(),
            role,
            name: None,
            address: None,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let service = test_service(test_config());

        let hash = service.hash_password("Password1!").unwrap();
        assert_ne!(hash, "Password1!");
        assert!(service.verify_password("Password1!", &hash));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_password() {
        let service = test_service(test_config());

        let hash = service.hash_password("Password1!").unwrap();
        assert!(!service.verify_password("Password2!", &hash));
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_hash() {
        let service = test_service(test_config());

        assert!(!service.verify_password("Password1!", "not-a-phc-string"));
        assert!(!service.verify_password("Password1!", ""));
    }

    #[tokio::test]
    async fn test_issued_token_carries_account_claims() {
        let service = test_service(test_config());
        let user = test_user(UserRole::User);

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[tokio::test]
    async fn test_token_embeds_admin_role() {
        let service = test_service(test_config());
        let user = test_user(UserRole::Admin);

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let service = test_service(test_config());
        let other = test_service(AppConfig {
            jwt_secret: "ffffffffffffffffffffffffffffffff".to_string(),
            ..test_config()
        });

        let token = other.issue_token(&test_user(UserRole::User)).unwrap();
        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        // A negative lifetime puts exp in the past, beyond the decoder's
        // leeway.
        let service = test_service(AppConfig {
            token_lifetime: -120,
            ..test_config()
        });

        let token = service.issue_token(&test_user(UserRole::User)).unwrap();
        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let service = test_service(test_config());

        assert!(matches!(
            service.verify_token("not-a-token"),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage_before_store_lookup() {
        // Verification fails first, so no Redis server is required.
        let service = test_service(test_config());

        assert!(matches!(
            service.authenticate("not-a-token").await,
            Err(AuthError::Unauthenticated)
        ));
    }
}
