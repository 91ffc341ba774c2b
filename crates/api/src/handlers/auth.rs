//! # Authentication Handlers
//!
//! Sign-up, sign-in/out, and credential management. Two distinct paths
//! exist for changing a password: the normal one, which always verifies the
//! current password, and the forced-setup one, which is only open to
//! accounts flagged with `requires_password_change` (freshly provisioned
//! trainers) and rotates the session on completion.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use gymdesk_core::{
    errors::GymError,
    models::user::{
        ChangePasswordRequest, MessageResponse, Role, SetPasswordRequest, SetPasswordResponse,
        SignInRequest, SignInResponse, SignUpRequest, SignUpResponse, UpdateNameRequest, User,
        UserResponse,
    },
};

use crate::{
    middleware::{
        auth::{self, CurrentUser},
        error_handling::AppError,
    },
    ApiState,
};

#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    payload.validate()?;

    // Pre-check for a friendlier message; the unique index still decides
    // the raced case inside create_user.
    let existing = gymdesk_db::repositories::user::find_by_email(&state.db_pool, &payload.email)
        .await
        .map_err(GymError::Database)?;
    if existing.is_some() {
        return Err(AppError(GymError::Conflict(
            "User with this email already exists".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&payload.password).map_err(GymError::Database)?;

    let user = gymdesk_db::repositories::user::create_user(
        &state.db_pool,
        payload.name.trim(),
        &payload.email,
        &password_hash,
        Role::Member,
        false,
    )
    .await?;

    let response = SignUpResponse {
        message: "Sign up successful! Please sign in.".to_string(),
        user: user.into_user()?,
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let user = gymdesk_db::repositories::user::find_by_email(&state.db_pool, &payload.email)
        .await
        .map_err(GymError::Database)?;

    // Unknown email and bad password are indistinguishable to the caller
    let Some(user) = user else {
        return Err(AppError(GymError::Unauthorized(
            "Invalid email or password".to_string(),
        )));
    };

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(AppError(GymError::Unauthorized(
            "Invalid email or password".to_string(),
        )));
    }

    let token = auth::generate_session_token();
    gymdesk_db::repositories::session::create_session(&state.db_pool, &token, user.id)
        .await
        .map_err(GymError::Database)?;

    tracing::debug!("Sign in successful for user {}", user.id);

    let response = SignInResponse {
        message: "Sign in successful!".to_string(),
        token,
        user: user.into_user()?,
    };

    Ok(Json(response))
}

/// Destroys the presented session. Idempotent: an absent or already-dead
/// token still reports success.
#[axum::debug_handler]
pub async fn sign_out(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(token) = auth::bearer_token(&headers) {
        gymdesk_db::repositories::session::delete_session(&state.db_pool, &token)
            .await
            .map_err(GymError::Database)?;
    }

    Ok(Json(MessageResponse {
        message: "Signed out.".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(_state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(user.into_user()?))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.new_password.is_empty() {
        return Err(AppError(GymError::Validation(
            "New password is required".to_string(),
        )));
    }

    // The current password is always verified here; only the forced-setup
    // flow may skip it.
    if !auth::verify_password(&payload.current_password, &user.password_hash) {
        return Err(AppError(GymError::Unauthorized(
            "Current password is incorrect".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&payload.new_password).map_err(GymError::Database)?;
    gymdesk_db::repositories::user::update_password(&state.db_pool, user.id, &password_hash)
        .await
        .map_err(GymError::Database)?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// Completes the forced rotation on a provisioned account. Only open while
/// `requires_password_change` is set; skips current-password verification
/// and re-authenticates the caller under the new credential by rotating
/// their sessions.
#[axum::debug_handler]
pub async fn set_password(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<SetPasswordResponse>, AppError> {
    if !user.requires_password_change {
        return Err(AppError(GymError::Validation(
            "No password change is pending for this account".to_string(),
        )));
    }
    if payload.new_password.is_empty() {
        return Err(AppError(GymError::Validation(
            "New password is required".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&payload.new_password).map_err(GymError::Database)?;
    let updated = gymdesk_db::repositories::user::update_password(&state.db_pool, user.id, &password_hash)
        .await
        .map_err(GymError::Database)?;

    // Invalidate every session issued against the old credential, then
    // hand the caller a fresh one.
    gymdesk_db::repositories::session::delete_sessions_for_user(&state.db_pool, user.id)
        .await
        .map_err(GymError::Database)?;
    let token = auth::generate_session_token();
    gymdesk_db::repositories::session::create_session(&state.db_pool, &token, user.id)
        .await
        .map_err(GymError::Database)?;

    let response = SetPasswordResponse {
        message: "Password updated successfully".to_string(),
        token,
        user: updated.into_user()?,
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_name(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateNameRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let new_name = payload.new_name.trim();
    let updated = gymdesk_db::repositories::user::update_name(&state.db_pool, user.id, new_name)
        .await
        .map_err(GymError::Database)?;

    // Trainer profiles carry a denormalized copy of the name
    gymdesk_db::repositories::trainer::sync_name_for_user(&state.db_pool, user.id, new_name)
        .await
        .map_err(GymError::Database)?;

    let response = UserResponse {
        message: "Name updated successfully!".to_string(),
        user: updated.into_user()?,
    };

    Ok(Json(response))
}
