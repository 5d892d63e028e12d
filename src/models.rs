//! Account Models
//!
//! Data structures for account entities, request/response DTOs, and
//! session token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

// ============================================
// Database Entities
// ============================================

/// Account role enum matching database type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub handle: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// ============================================
// Request DTOs
// ============================================

/// Password policy: minimum 8 characters with at least one uppercase letter,
/// one lowercase letter, one digit, and one special character.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        let mut err = ValidationError::new("password_too_short");
        err.message = Some("Password must be at least 8 characters".into());
        return Err(err);
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| "!@#$%^&*".contains(c));

    if !has_upper || !has_lower || !has_digit || !has_special {
        let mut err = ValidationError::new("password_too_weak");
        err.message = Some(
            "Password must contain uppercase, lowercase, digit, and special characters".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Handle must be 1-64 characters"))]
    pub handle: String,

    #[validate(custom(function = validate_password_strength))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub address: Option<String>,

    pub comment: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Handle is required"))]
    pub handle: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub address: Option<String>,

    pub comment: Option<String>,

    pub role: Option<UserRole>,

    #[validate(custom(function = validate_password_strength))]
    pub password: Option<String>,
}

/// Listing query parameters for the admin user index
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub role: Option<UserRole>,
    pub handle: Option<String>,
    pub name: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

/// Public account data without the credential hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub handle: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            handle: user.handle,
            role: user.role,
            name: user.name,
            address: user.address,
            comment: user.comment,
            created_at: user.created_at,
        }
    }
}

/// Session token response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: i64,
    /// Account handle
    pub username: String,
    /// Account role
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_accepts_valid() {
        assert!(validate_password_strength("Password1!").is_ok());
    }

    #[test]
    fn test_password_strength_rejects_short() {
        assert!(validate_password_strength("Pw1!").is_err());
    }

    #[test]
    fn test_password_strength_rejects_missing_classes() {
        assert!(validate_password_strength("password1!").is_err()); // no uppercase
        assert!(validate_password_strength("PASSWORD1!").is_err()); // no lowercase
        assert!(validate_password_strength("Password!!").is_err()); // no digit
        assert!(validate_password_strength("Password11").is_err()); // no special
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn test_credential_hash_never_serialized() {
        let user = User {
            id: 1,
            handle: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: UserRole::User,
            name: None,
            address: None,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["handle"], "alice");
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            handle: "alice".to_string(),
            password: "Password1!".to_string(),
            role: UserRole::User,
            name: None,
            address: None,
            comment: None,
        };
        assert!(req.validate().is_ok());

        let weak = RegisterRequest {
            password: "weak".to_string(),
            ..req
        };
        assert!(weak.validate().is_err());
    }
}
