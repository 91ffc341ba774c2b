//! # Trainer Handlers
//!
//! Trainer profiles are provisioned by admins: creating one also creates
//! the owning TRAINER user with a default initial credential (hashed like
//! any other) and the forced password-rotation flag set. Deleting a
//! profile unassigns it from classes and keeps the user account.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use gymdesk_core::{
    errors::GymError,
    models::{
        trainer::{
            CreateTrainerRequest, TrainerResponse, TrainerWithEmail, UpdateTrainerRequest,
            DEFAULT_TRAINER_IMAGE_URL,
        },
        user::MessageResponse,
    },
};

use gymdesk_db::models::DbTrainerWithEmail;

use crate::{
    middleware::{
        auth::{self, AdminUser},
        error_handling::AppError,
    },
    ApiState,
};

/// Initial credential for provisioned trainer accounts. Hashed normally at
/// creation; the account's forced-rotation flag is what gates first use.
const DEFAULT_TRAINER_PASSWORD: &str = "changeme";

fn to_trainer_with_email(row: DbTrainerWithEmail) -> TrainerWithEmail {
    TrainerWithEmail {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        specialty: row.specialty,
        image_url: row.image_url,
        email: row.email,
        created_at: row.created_at,
    }
}

#[axum::debug_handler]
pub async fn list_trainers(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<TrainerWithEmail>>, AppError> {
    let trainers = gymdesk_db::repositories::trainer::list_trainers(&state.db_pool)
        .await
        .map_err(GymError::Database)?;

    Ok(Json(trainers.into_iter().map(to_trainer_with_email).collect()))
}

#[axum::debug_handler]
pub async fn create_trainer(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateTrainerRequest>,
) -> Result<Json<TrainerResponse>, AppError> {
    payload.validate()?;

    let password_hash =
        auth::hash_password(DEFAULT_TRAINER_PASSWORD).map_err(GymError::Database)?;
    let image_url = payload
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TRAINER_IMAGE_URL.to_string());

    let trainer = gymdesk_db::repositories::trainer::create_with_user(
        &state.db_pool,
        payload.name.trim(),
        &payload.email,
        &password_hash,
        payload.specialty.trim(),
        &image_url,
    )
    .await?;

    let response = TrainerResponse {
        message: "Trainer added successfully.".to_string(),
        trainer: to_trainer_with_email(trainer),
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_trainer(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrainerRequest>,
) -> Result<Json<TrainerResponse>, AppError> {
    if payload.name.trim().len() < 2 {
        return Err(AppError(GymError::Validation(
            "Name must be at least 2 characters".to_string(),
        )));
    }

    let image_url = payload
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TRAINER_IMAGE_URL.to_string());

    let trainer = gymdesk_db::repositories::trainer::update_trainer(
        &state.db_pool,
        id,
        payload.name.trim(),
        payload.specialty.trim(),
        &image_url,
    )
    .await
    .map_err(GymError::Database)?
    .ok_or_else(|| GymError::NotFound(format!("Trainer with ID {} not found", id)))?;

    let response = TrainerResponse {
        message: "Trainer updated successfully.".to_string(),
        trainer: to_trainer_with_email(trainer),
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn delete_trainer(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    // Classes survive their trainer: clear the reference, then drop the
    // profile. The user account is left alone.
    gymdesk_db::repositories::gym_class::unassign_trainer(&state.db_pool, id)
        .await
        .map_err(GymError::Database)?;

    let deleted = gymdesk_db::repositories::trainer::delete_trainer(&state.db_pool, id)
        .await
        .map_err(GymError::Database)?;

    if !deleted {
        return Err(AppError(GymError::NotFound(format!(
            "Trainer with ID {} not found",
            id
        ))));
    }

    Ok(Json(MessageResponse {
        message: "Trainer profile deleted successfully.".to_string(),
    }))
}
