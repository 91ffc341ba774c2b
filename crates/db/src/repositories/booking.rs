use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use gymdesk_core::errors::{GymError, GymResult};
use gymdesk_core::models::booking::check_reservation;

use crate::models::{DbBooking, DbBookingWithClass};
use crate::repositories::is_unique_violation;

const BOOKING_COLUMNS: &str = "id, user_id, class_id, created_at";

fn storage(e: sqlx::Error) -> GymError {
    GymError::Database(eyre::Report::new(e))
}

/// Reserves a seat for `user_id` in `class_id`.
///
/// The whole decision runs in one transaction. The class row is locked
/// with FOR UPDATE first, which serializes concurrent reserves on the same
/// class while leaving reserves on other classes untouched; the duplicate
/// and occupancy reads that feed the admission check therefore see every
/// booking committed before this one. The unique (user_id, class_id)
/// constraint backstops the duplicate check: if a raced insert slips
/// through anyway it comes back as AlreadyBooked, not a storage error.
pub async fn reserve(pool: &Pool<Postgres>, user_id: Uuid, class_id: Uuid) -> GymResult<DbBooking> {
    tracing::debug!("Reserving class {} for user {}", class_id, user_id);

    let mut tx = pool.begin().await.map_err(storage)?;

    let capacity = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT capacity
        FROM gym_classes
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(class_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(storage)?;

    let Some(capacity) = capacity else {
        return Err(GymError::NotFound("Class not found".to_string()));
    };

    let already_booked = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE user_id = $1 AND class_id = $2
        "#,
    )
    .bind(user_id)
    .bind(class_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(storage)?
        > 0;

    let booked_count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE class_id = $1
        "#,
    )
    .bind(class_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(storage)?;

    check_reservation(capacity, booked_count, already_booked)?;

    let id = Uuid::new_v4();
    let now = Utc::now();

    let insert = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings (id, user_id, class_id, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(user_id)
    .bind(class_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let booking = match insert {
        Ok(booking) => booking,
        Err(e) if is_unique_violation(&e) => {
            return Err(GymError::AlreadyBooked(
                "You have already booked this class".to_string(),
            ));
        }
        Err(e) => return Err(storage(e)),
    };

    tx.commit().await.map_err(storage)?;

    tracing::debug!("Booking created: {}", booking.id);
    Ok(booking)
}

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Cancels a booking on behalf of its owner.
///
/// NotFound when the id does not resolve, Forbidden when it belongs to
/// someone else (the booking is left intact). The delete itself is scoped
/// to (id, user_id); losing a race against another cancel of the same
/// booking reports NotFound rather than silently succeeding twice.
pub async fn cancel_owned(pool: &Pool<Postgres>, booking_id: Uuid, user_id: Uuid) -> GymResult<()> {
    tracing::debug!("Cancelling booking {} for user {}", booking_id, user_id);

    let booking = get_booking_by_id(pool, booking_id)
        .await
        .map_err(GymError::Database)?;

    let Some(booking) = booking else {
        return Err(GymError::NotFound("Booking not found".to_string()));
    };

    if booking.user_id != user_id {
        return Err(GymError::Forbidden(
            "You are not authorized to cancel this booking".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(booking_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(storage)?;

    if result.rows_affected() == 0 {
        return Err(GymError::NotFound("Booking not found".to_string()));
    }

    Ok(())
}

/// A user's bookings joined with class and trainer detail. Display order
/// (calendar day, then start time) is applied in core.
pub async fn list_for_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<DbBookingWithClass>> {
    tracing::debug!("Listing bookings for user: {}", user_id);

    let bookings = sqlx::query_as::<_, DbBookingWithClass>(
        r#"
        SELECT b.id, b.user_id, b.class_id, c.service_title, t.name AS trainer_name,
               c.day_of_week, c.start_time, c.end_time, b.created_at
        FROM bookings b
        JOIN gym_classes c ON c.id = b.class_id
        LEFT JOIN trainers t ON t.id = c.trainer_id
        WHERE b.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Live booking count for one class.
pub async fn occupancy(pool: &Pool<Postgres>, class_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE class_id = $1
        "#,
    )
    .bind(class_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Class ids the user currently holds a booking for. Feeds the schedule
/// projector's eligibility classification.
pub async fn booked_class_ids(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT class_id
        FROM bookings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
