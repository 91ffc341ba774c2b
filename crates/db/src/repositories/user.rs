use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use gymdesk_core::errors::{GymError, GymResult};
use gymdesk_core::models::user::Role;

use crate::models::DbUser;
use crate::repositories::is_unique_violation;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, requires_password_change, created_at, updated_at";

/// Email lookup is case-insensitive; the unique index on LOWER(email) is
/// the matching constraint.
pub async fn find_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    tracing::debug!("Looking up user by email");

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    tracing::debug!("Looking up user by id: {}", id);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Creates a user. Fails with `Conflict` when the email is already taken,
/// including the case where a concurrent signup won the race and the
/// unique index rejected this insert.
pub async fn create_user(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    requires_password_change: bool,
) -> GymResult<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, role={}", id, role);

    let result = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, requires_password_change, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(requires_password_change)
    .bind(now)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e) => Err(GymError::Conflict(
            "User with this email already exists".to_string(),
        )),
        Err(e) => Err(GymError::Database(eyre::Report::new(e))),
    }
}

pub async fn update_name(pool: &Pool<Postgres>, id: Uuid, name: &str) -> Result<DbUser> {
    tracing::debug!("Updating name for user: {}", id);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        UPDATE users
        SET name = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Stores a new credential and clears the forced-rotation flag in the same
/// statement, so the two can never be observed out of sync.
pub async fn update_password(pool: &Pool<Postgres>, id: Uuid, password_hash: &str) -> Result<DbUser> {
    tracing::debug!("Updating password for user: {}", id);

    let user = sqlx::query_as::<_, DbUser>(&format!(
        r#"
        UPDATE users
        SET password_hash = $2, requires_password_change = FALSE, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
