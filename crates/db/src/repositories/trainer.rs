use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use gymdesk_core::errors::{GymError, GymResult};
use gymdesk_core::models::user::Role;

use crate::models::{DbTrainer, DbTrainerWithEmail, DbUser};
use crate::repositories::is_unique_violation;

pub async fn list_trainers(pool: &Pool<Postgres>) -> Result<Vec<DbTrainerWithEmail>> {
    tracing::debug!("Listing trainers");

    let trainers = sqlx::query_as::<_, DbTrainerWithEmail>(
        r#"
        SELECT t.id, t.user_id, t.name, t.specialty, t.image_url, u.email, t.created_at
        FROM trainers t
        JOIN users u ON u.id = t.user_id
        ORDER BY t.name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(trainers)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbTrainer>> {
    let trainer = sqlx::query_as::<_, DbTrainer>(
        r#"
        SELECT id, user_id, name, specialty, image_url, created_at
        FROM trainers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(trainer)
}

/// Provisions a trainer account: the TRAINER user (with the forced
/// password-rotation flag set) and the profile row commit together, so a
/// failure partway leaves nothing behind.
pub async fn create_with_user(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
    specialty: &str,
    image_url: &str,
) -> GymResult<DbTrainerWithEmail> {
    let user_id = Uuid::new_v4();
    let trainer_id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating trainer: user_id={}, trainer_id={}", user_id, trainer_id);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| GymError::Database(eyre::Report::new(e)))?;

    let user_insert = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, requires_password_change, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        RETURNING id, name, email, password_hash, role, requires_password_change, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(Role::Trainer.as_str())
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let user = match user_insert {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(GymError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        Err(e) => return Err(GymError::Database(eyre::Report::new(e))),
    };

    let trainer = sqlx::query_as::<_, DbTrainer>(
        r#"
        INSERT INTO trainers (id, user_id, name, specialty, image_url, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, name, specialty, image_url, created_at
        "#,
    )
    .bind(trainer_id)
    .bind(user_id)
    .bind(name)
    .bind(specialty)
    .bind(image_url)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| GymError::Database(eyre::Report::new(e)))?;

    tx.commit()
        .await
        .map_err(|e| GymError::Database(eyre::Report::new(e)))?;

    Ok(DbTrainerWithEmail {
        id: trainer.id,
        user_id: trainer.user_id,
        name: trainer.name,
        specialty: trainer.specialty,
        image_url: trainer.image_url,
        email: user.email,
        created_at: trainer.created_at,
    })
}

/// Updates the profile and syncs the denormalized name back onto the
/// owning user.
pub async fn update_trainer(
    pool: &Pool<Postgres>,
    id: Uuid,
    name: &str,
    specialty: &str,
    image_url: &str,
) -> Result<Option<DbTrainerWithEmail>> {
    tracing::debug!("Updating trainer: {}", id);

    let mut tx = pool.begin().await?;

    let trainer = sqlx::query_as::<_, DbTrainer>(
        r#"
        UPDATE trainers
        SET name = $2, specialty = $3, image_url = $4
        WHERE id = $1
        RETURNING id, user_id, name, specialty, image_url, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(specialty)
    .bind(image_url)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(trainer) = trainer else {
        tx.rollback().await?;
        return Ok(None);
    };

    let email = sqlx::query_scalar::<_, String>(
        r#"
        UPDATE users
        SET name = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING email
        "#,
    )
    .bind(trainer.user_id)
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(DbTrainerWithEmail {
        id: trainer.id,
        user_id: trainer.user_id,
        name: trainer.name,
        specialty: trainer.specialty,
        image_url: trainer.image_url,
        email,
        created_at: trainer.created_at,
    }))
}

/// Keeps trainers.name in step when a trainer user renames themselves.
/// No-op for members and admins.
pub async fn sync_name_for_user(pool: &Pool<Postgres>, user_id: Uuid, name: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE trainers
        SET name = $2
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes a trainer profile. The owning user account survives; callers
/// unassign the trainer from classes first (the SET NULL foreign key is
/// the backstop). Returns false when the profile was already gone.
pub async fn delete_trainer(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    tracing::debug!("Deleting trainer: {}", id);

    let result = sqlx::query(
        r#"
        DELETE FROM trainers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
