//! # Schedule Handler
//!
//! The public weekly schedule: every class with live occupancy, grouped by
//! weekday in calendar order. Read-only — booking goes through the booking
//! endpoints, never through here.

use axum::{extract::State, Json};
use std::collections::HashSet;
use std::sync::Arc;

use gymdesk_core::{
    errors::GymError,
    models::schedule::{project_schedule, ScheduleResponse},
};

use crate::{
    middleware::{auth::OptionalUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<ApiState>>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<ScheduleResponse>, AppError> {
    let classes = gymdesk_db::repositories::gym_class::list_with_details(&state.db_pool)
        .await
        .map_err(GymError::Database)?;

    let classes = classes
        .into_iter()
        .map(|c| c.into_details())
        .collect::<Result<Vec<_>, _>>()?;

    // Signed-in callers get per-class eligibility on top of the counts
    let booked: Option<HashSet<_>> = match &user {
        Some(user) => Some(
            gymdesk_db::repositories::booking::booked_class_ids(&state.db_pool, user.id)
                .await
                .map_err(GymError::Database)?
                .into_iter()
                .collect(),
        ),
        None => None,
    };

    let days = project_schedule(classes, booked.as_ref());

    Ok(Json(ScheduleResponse { days }))
}
