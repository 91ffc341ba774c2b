use chrono::{NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use gymdesk_core::models::day::DayOfWeek;

use crate::models::{DbClassWithDetails, DbGymClass};

const CLASS_COLUMNS: &str =
    "id, service_title, trainer_id, day_of_week, start_time, end_time, capacity, created_at";

const DETAILS_QUERY: &str = r#"
    SELECT c.id, c.service_title, c.trainer_id, t.name AS trainer_name,
           c.day_of_week, c.start_time, c.end_time, c.capacity,
           COUNT(b.id) AS booked_count, c.created_at
    FROM gym_classes c
    LEFT JOIN trainers t ON t.id = c.trainer_id
    LEFT JOIN bookings b ON b.class_id = c.id
"#;

pub async fn create_class(
    pool: &Pool<Postgres>,
    service_title: &str,
    trainer_id: Option<Uuid>,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    capacity: i32,
) -> Result<DbGymClass> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating class: id={}, title={}, day={}",
        id,
        service_title,
        day_of_week
    );

    let class = sqlx::query_as::<_, DbGymClass>(&format!(
        r#"
        INSERT INTO gym_classes (id, service_title, trainer_id, day_of_week, start_time, end_time, capacity, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {CLASS_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(service_title)
    .bind(trainer_id)
    .bind(day_of_week.as_str())
    .bind(start_time)
    .bind(end_time)
    .bind(capacity)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(class)
}

pub async fn get_class_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbGymClass>> {
    let class = sqlx::query_as::<_, DbGymClass>(&format!(
        r#"
        SELECT {CLASS_COLUMNS}
        FROM gym_classes
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(class)
}

pub async fn update_class(
    pool: &Pool<Postgres>,
    id: Uuid,
    service_title: &str,
    trainer_id: Option<Uuid>,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    capacity: i32,
) -> Result<Option<DbGymClass>> {
    tracing::debug!("Updating class: {}", id);

    let class = sqlx::query_as::<_, DbGymClass>(&format!(
        r#"
        UPDATE gym_classes
        SET service_title = $2, trainer_id = $3, day_of_week = $4,
            start_time = $5, end_time = $6, capacity = $7
        WHERE id = $1
        RETURNING {CLASS_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(service_title)
    .bind(trainer_id)
    .bind(day_of_week.as_str())
    .bind(start_time)
    .bind(end_time)
    .bind(capacity)
    .fetch_optional(pool)
    .await?;

    Ok(class)
}

/// Deletes a class; its bookings go with it via the cascade on
/// bookings.class_id. Returns false when the class was already gone.
pub async fn delete_class(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    tracing::debug!("Deleting class: {}", id);

    let result = sqlx::query(
        r#"
        DELETE FROM gym_classes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All classes with trainer name and live occupancy. Day ordering is left
/// to the caller — the calendar order lives in core, not in SQL.
pub async fn list_with_details(pool: &Pool<Postgres>) -> Result<Vec<DbClassWithDetails>> {
    tracing::debug!("Listing classes with occupancy");

    let classes = sqlx::query_as::<_, DbClassWithDetails>(&format!(
        r#"
        {DETAILS_QUERY}
        GROUP BY c.id, t.name
        ORDER BY c.start_time ASC
        "#,
    ))
    .fetch_all(pool)
    .await?;

    Ok(classes)
}

pub async fn get_details_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbClassWithDetails>> {
    let class = sqlx::query_as::<_, DbClassWithDetails>(&format!(
        r#"
        {DETAILS_QUERY}
        WHERE c.id = $1
        GROUP BY c.id, t.name
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(class)
}

/// Clears the trainer from every class that references it. The classes
/// themselves are kept.
pub async fn unassign_trainer(pool: &Pool<Postgres>, trainer_id: Uuid) -> Result<u64> {
    tracing::debug!("Unassigning trainer {} from classes", trainer_id);

    let result = sqlx::query(
        r#"
        UPDATE gym_classes
        SET trainer_id = NULL
        WHERE trainer_id = $1
        "#,
    )
    .bind(trainer_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
