//! User Profile and Administration
//!
//! Ordinary data access over the account store: the current caller's
//! profile, profile updates, and the admin-only listing and removal
//! endpoints. Authentication invariants live in `service`; everything here
//! is a store call plus response shaping.

use crate::error::AuthError;
use crate::extractors::AuthUser;
use crate::models::{
    ListUsersQuery, MessageResponse, UpdateUserRequest, User, UserListResponse, UserResponse,
};
use crate::service::AuthService;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use validator::Validate;

/// Shared user service state
pub type UsersState = Arc<UserService>;

/// User profile service
pub struct UserService {
    db: PgPool,
    auth: Arc<AuthService>,
}

impl UserService {
    /// Create a new user service
    ///
    /// The auth service supplies password hashing for profile updates.
    pub fn new(db: PgPool, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    /// Find an account by id
    pub async fn find_one(&self, id: i64) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(user)
    }

    /// Update an account's profile fields; absent fields are unchanged
    pub async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<User, AuthError> {
        let password_hash = match &req.password {
            Some(password) => Some(self.auth.hash_password(password)?),
            None => None,
        };

        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                comment = COALESCE($4, comment),
                role = COALESCE($5, role),
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.comment)
        .bind(&req.role)
        .bind(&password_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::NotFound)?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, "user profile updated");
        Ok(user)
    }

    /// Remove an account by id
    pub async fn remove(&self, id: i64) -> Result<(), AuthError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        tx.commit().await?;

        tracing::info!(user_id = id, "user removed");
        Ok(())
    }

    /// List accounts with pagination, filtering, and sorting
    pub async fn list(&self, query: &ListUsersQuery) -> Result<(Vec<User>, i64), AuthError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let sort = sort_column(query.sort_by.as_deref())?;
        let order = order_direction(query.order.as_deref());

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        let mut select = QueryBuilder::new("SELECT * FROM users");
        push_filters(&mut select, query);
        // sort and order come from the whitelists above, never from input.
        select.push(" ORDER BY ");
        select.push(sort);
        select.push(" ");
        select.push(order);
        select.push(" LIMIT ");
        select.push_bind(limit);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * limit);

        let users = select
            .build_query_as::<User>()
            .fetch_all(&self.db)
            .await?;

        tracing::info!(total, page, limit, "user listing retrieved");
        Ok((users, total))
    }
}

fn sort_column(sort_by: Option<&str>) -> Result<&'static str, AuthError> {
    match sort_by.unwrap_or("id") {
        "id" => Ok("id"),
        "handle" => Ok("handle"),
        "name" => Ok("name"),
        "role" => Ok("role"),
        "created_at" => Ok("created_at"),
        other => Err(AuthError::Validation(format!(
            "cannot sort by \"{other}\""
        ))),
    }
}

fn order_direction(order: Option<&str>) -> &'static str {
    match order {
        Some(o) if o.eq_ignore_ascii_case("desc") => "DESC",
        _ => "ASC",
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListUsersQuery) {
    let mut prefix = " WHERE ";

    if let Some(role) = &query.role {
        builder.push(prefix);
        builder.push("role = ");
        builder.push_bind(role.clone());
        prefix = " AND ";
    }

    if let Some(handle) = &query.handle {
        builder.push(prefix);
        builder.push("handle LIKE ");
        builder.push_bind(format!("%{handle}%"));
        prefix = " AND ";
    }

    if let Some(name) = &query.name {
        builder.push(prefix);
        builder.push("name LIKE ");
        builder.push_bind(format!("%{name}%"));
    }
}

// ============================================
// Handlers
// ============================================

/// GET /users/me
///
/// Current caller's profile
pub async fn get_me(
    State(users): State<UsersState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AuthError> {
    let account = users.find_one(user.id).await?;

    Ok(Json(UserResponse::from(account)))
}

/// PATCH /users/me
///
/// Update the current caller's profile
pub async fn update_me(
    State(users): State<UsersState>,
    user: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let account = users.update(user.id, req).await?;

    Ok(Json(UserResponse::from(account)))
}

/// GET /users
///
/// Admin-only paginated listing
pub async fn list_users(
    State(users): State<UsersState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AuthError> {
    let (data, total) = users.list(&query).await?;

    Ok(Json(UserListResponse {
        data: data.into_iter().map(UserResponse::from).collect(),
        total,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(10).clamp(1, 100),
    }))
}

/// DELETE /users/:id
///
/// Admin-only account removal
pub async fn remove_user(
    State(users): State<UsersState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AuthError> {
    users.remove(id).await?;

    Ok(Json(MessageResponse::new("User removed successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn empty_query() -> ListUsersQuery {
        ListUsersQuery {
            page: None,
            limit: None,
            sort_by: None,
            order: None,
            role: None,
            handle: None,
            name: None,
        }
    }

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!(sort_column(None).unwrap(), "id");
        assert_eq!(sort_column(Some("handle")).unwrap(), "handle");
        assert!(sort_column(Some("password_hash")).is_err());
        assert!(sort_column(Some("id; DROP TABLE users")).is_err());
    }

    #[test]
    fn test_order_direction_defaults_to_asc() {
        assert_eq!(order_direction(None), "ASC");
        assert_eq!(order_direction(Some("desc")), "DESC");
        assert_eq!(order_direction(Some("DESC")), "DESC");
        assert_eq!(order_direction(Some("sideways")), "ASC");
    }

    #[test]
    fn test_filters_are_bound_not_spliced() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM users");
        let query = ListUsersQuery {
            role: Some(UserRole::Admin),
            handle: Some("ali".to_string()),
            name: Some("A".to_string()),
            ..empty_query()
        };

        push_filters(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE role = $1 AND handle LIKE $2 AND name LIKE $3"
        );
    }

    #[test]
    fn test_no_filters_no_where_clause() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");

        push_filters(&mut builder, &empty_query());

        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM users");
    }
}
