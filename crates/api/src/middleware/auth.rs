//! # Authentication Module
//!
//! This module provides authentication-related utilities for the GymDesk API:
//! Argon2 password hashing and verification, session-token generation, and
//! the request extractors that resolve the current actor from a bearer
//! token.
//!
//! Sessions are opaque server-side tokens. The extractors read the user
//! fresh from the database on every request, so a role, name, or credential
//! change is visible to the very next call made with the same token.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use eyre::Result;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

use gymdesk_core::errors::GymError;
use gymdesk_core::models::user::Role;
use gymdesk_db::models::DbUser;

use crate::{middleware::error_handling::AppError, ApiState};

/// Length of generated session tokens.
const SESSION_TOKEN_LENGTH: usize = 48;

/// Hashes a password using the Argon2 algorithm
///
/// This function securely hashes passwords before storage in the database,
/// automatically generating a random salt and using industry-standard
/// parameters for Argon2.
///
/// # Security Notes
///
/// - Uses a random salt for each password
/// - Uses default Argon2 parameters (memory: 19MiB, iterations: 3, parallelism: 4)
/// - Returns password in PHC string format (includes algorithm, version, parameters, salt, and hash)
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against a stored PHC-format hash.
///
/// A malformed stored hash verifies as false rather than erroring — the
/// caller only ever learns "credentials did not match".
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generates a random session token.
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Pulls the bearer token out of the Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

async fn resolve_user(state: &ApiState, headers: &HeaderMap) -> Result<Option<DbUser>, AppError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let user = gymdesk_db::repositories::session::find_user_by_token(&state.db_pool, &token)
        .await
        .map_err(GymError::Database)?;

    Ok(user)
}

/// Extractor for the current authenticated user.
///
/// Rejects with `Unauthorized` when the bearer token is missing or does not
/// resolve to a live session.
pub struct CurrentUser(pub DbUser);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(state, &parts.headers).await?;
        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AppError(GymError::Unauthorized(
                "Not authenticated".to_string(),
            ))),
        }
    }
}

/// Extractor for admin-gated endpoints.
///
/// Resolves the current user and rejects with `Forbidden` unless the
/// account role is ADMIN.
pub struct AdminUser(pub DbUser);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role()? != Role::Admin {
            return Err(AppError(GymError::Forbidden(
                "Admin access required".to_string(),
            )));
        }
        Ok(AdminUser(user))
    }
}

/// Extractor for endpoints that personalize when a session is present but
/// still serve anonymous callers. A stale or missing token yields `None`
/// rather than a rejection.
pub struct OptionalUser(pub Option<DbUser>);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(state, &parts.headers).await?;
        Ok(OptionalUser(user))
    }
}
