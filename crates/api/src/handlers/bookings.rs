//! # Booking Handlers
//!
//! The thin HTTP face of the booking engine. Admission and atomicity live
//! in the storage layer (one transaction per reserve); these handlers
//! resolve the caller and translate results.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use gymdesk_core::{
    errors::GymError,
    models::{
        booking::{
            sort_for_display, ListBookingsResponse, ReserveBookingRequest,
            ReserveBookingResponse,
        },
        user::MessageResponse,
    },
};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ListBookingsResponse>, AppError> {
    let rows = gymdesk_db::repositories::booking::list_for_user(&state.db_pool, user.id)
        .await
        .map_err(GymError::Database)?;

    let mut bookings = rows
        .into_iter()
        .map(|row| row.into_details())
        .collect::<Result<Vec<_>, _>>()?;

    // Calendar day order, then start time — not alphabetical by day name
    sort_for_display(&mut bookings);

    Ok(Json(ListBookingsResponse { bookings }))
}

#[axum::debug_handler]
pub async fn reserve_booking(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ReserveBookingRequest>,
) -> Result<Json<ReserveBookingResponse>, AppError> {
    let booking =
        gymdesk_db::repositories::booking::reserve(&state.db_pool, user.id, payload.class_id)
            .await?;

    let response = ReserveBookingResponse {
        message: "Class booked successfully!".to_string(),
        booking: booking.into_booking(),
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    gymdesk_db::repositories::booking::cancel_owned(&state.db_pool, id, user.id).await?;

    Ok(Json(MessageResponse {
        message: "Booking cancelled successfully.".to_string(),
    }))
}
