//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the GymDesk API.
//! It maps domain-specific errors to appropriate HTTP status codes and JSON
//! error responses, ensuring a consistent error handling experience across
//! the entire API.
//!
//! Storage-level failures are logged server-side and surfaced to clients as
//! a generic message; backend error details never reach the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use gymdesk_core::errors::GymError;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `GymError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub GymError);

/// Converts application errors to HTTP responses
///
/// This implementation maps each error type to the appropriate HTTP status
/// code and formats the error message into a JSON response body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            GymError::NotFound(_) => StatusCode::NOT_FOUND,
            GymError::Conflict(_) => StatusCode::CONFLICT,
            GymError::AlreadyBooked(_) => StatusCode::CONFLICT,
            GymError::ClassFull(_) => StatusCode::CONFLICT,
            GymError::Forbidden(_) => StatusCode::FORBIDDEN,
            GymError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GymError::Validation(_) => StatusCode::BAD_REQUEST,
            GymError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GymError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Unexpected backend failures are logged but not echoed to clients
        let message = match &self.0 {
            GymError::Database(_) | GymError::Internal(_) => {
                tracing::error!("Unexpected error handling request: {}", self.0);
                "An unexpected error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message }));

        // Combine status code and JSON body into a response
        (status, body).into_response()
    }
}

/// Automatic conversion from GymError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, GymError>` in handler functions that return `Result<T, AppError>`.
impl From<GymError> for AppError {
    fn from(err: GymError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, eyre::Report>` in handler functions that return `Result<T, AppError>`.
/// It wraps the eyre error in a GymError::Database variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(GymError::Database(err))
    }
}

/// Maps a GymError to an HTTP response
pub fn map_error(err: GymError) -> Response {
    AppError(err).into_response()
}
