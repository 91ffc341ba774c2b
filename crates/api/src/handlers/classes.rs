//! # Class Handlers
//!
//! Admin CRUD over the weekly class offerings. Partial updates are merged
//! over the stored row and the merged result re-validated before anything
//! is written, so a patch can never leave an inverted time window or a
//! zero capacity behind.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use gymdesk_core::{
    errors::GymError,
    models::{
        gym_class::{ClassResponse, ClassWithDetails, CreateClassRequest, UpdateClassRequest},
        user::MessageResponse,
    },
};

use crate::{
    middleware::{auth::AdminUser, error_handling::AppError},
    ApiState,
};

async fn ensure_trainer_exists(state: &ApiState, trainer_id: Uuid) -> Result<(), AppError> {
    let trainer = gymdesk_db::repositories::trainer::find_by_id(&state.db_pool, trainer_id)
        .await
        .map_err(GymError::Database)?;
    if trainer.is_none() {
        return Err(AppError(GymError::NotFound(format!(
            "Trainer with ID {} not found",
            trainer_id
        ))));
    }
    Ok(())
}

async fn details_for(state: &ApiState, class_id: Uuid) -> Result<ClassWithDetails, AppError> {
    let details = gymdesk_db::repositories::gym_class::get_details_by_id(&state.db_pool, class_id)
        .await
        .map_err(GymError::Database)?
        .ok_or_else(|| GymError::NotFound(format!("Class with ID {} not found", class_id)))?;
    Ok(details.into_details()?)
}

#[axum::debug_handler]
pub async fn list_classes(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ClassWithDetails>>, AppError> {
    let classes = gymdesk_db::repositories::gym_class::list_with_details(&state.db_pool)
        .await
        .map_err(GymError::Database)?;

    let classes = classes
        .into_iter()
        .map(|c| c.into_details())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(classes))
}

#[axum::debug_handler]
pub async fn create_class(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateClassRequest>,
) -> Result<Json<ClassResponse>, AppError> {
    payload.validate()?;

    if let Some(trainer_id) = payload.trainer_id {
        ensure_trainer_exists(&state, trainer_id).await?;
    }

    let class = gymdesk_db::repositories::gym_class::create_class(
        &state.db_pool,
        payload.service_title.trim(),
        payload.trainer_id,
        payload.day_of_week,
        payload.start_time,
        payload.end_time,
        payload.capacity,
    )
    .await
    .map_err(GymError::Database)?;

    let response = ClassResponse {
        message: "Class added successfully.".to_string(),
        class: details_for(&state, class.id).await?,
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_class(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<Json<ClassResponse>, AppError> {
    let current = gymdesk_db::repositories::gym_class::get_class_by_id(&state.db_pool, id)
        .await
        .map_err(GymError::Database)?
        .ok_or_else(|| GymError::NotFound(format!("Class with ID {} not found", id)))?
        .into_class()?;

    let merged = payload.merge_into(&current)?;

    // A newly assigned trainer must exist; keeping or clearing one needs
    // no check.
    if let Some(Some(trainer_id)) = payload.trainer_id {
        ensure_trainer_exists(&state, trainer_id).await?;
    }

    gymdesk_db::repositories::gym_class::update_class(
        &state.db_pool,
        id,
        &merged.service_title,
        merged.trainer_id,
        merged.day_of_week,
        merged.start_time,
        merged.end_time,
        merged.capacity,
    )
    .await
    .map_err(GymError::Database)?
    .ok_or_else(|| GymError::NotFound(format!("Class with ID {} not found", id)))?;

    let response = ClassResponse {
        message: "Class updated successfully.".to_string(),
        class: details_for(&state, id).await?,
    };

    Ok(Json(response))
}

/// Deletes a class. Its bookings are cascade-deleted with it.
#[axum::debug_handler]
pub async fn delete_class(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = gymdesk_db::repositories::gym_class::delete_class(&state.db_pool, id)
        .await
        .map_err(GymError::Database)?;

    if !deleted {
        return Err(AppError(GymError::NotFound(format!(
            "Class with ID {} not found",
            id
        ))));
    }

    Ok(Json(MessageResponse {
        message: "Class deleted successfully.".to_string(),
    }))
}
