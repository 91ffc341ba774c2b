use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbSession, DbUser};

pub async fn create_session(pool: &Pool<Postgres>, token: &str, user_id: Uuid) -> Result<DbSession> {
    let now = Utc::now();

    tracing::debug!("Creating session for user: {}", user_id);

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, created_at)
        VALUES ($1, $2, $3)
        RETURNING token, user_id, created_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Resolves the user behind a session token, fresh from the store. Every
/// request goes through this, so role or name changes are visible on the
/// very next call — there is no cached actor state to go stale.
pub async fn find_user_by_token(pool: &Pool<Postgres>, token: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT u.id, u.name, u.email, u.password_hash, u.role,
               u.requires_password_change, u.created_at, u.updated_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Idempotent: deleting an unknown or already-deleted token is a no-op.
pub async fn delete_session(pool: &Pool<Postgres>, token: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Invalidates every session the user holds. Used when a credential is
/// rotated through the forced-setup flow.
pub async fn delete_sessions_for_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<()> {
    tracing::debug!("Deleting all sessions for user: {}", user_id);

    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}
