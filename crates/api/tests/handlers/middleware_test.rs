use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

use gymdesk_api::middleware::auth;
use gymdesk_api::middleware::error_handling::map_error;
use gymdesk_core::errors::GymError;

#[tokio::test]
async fn test_error_handling_not_found() {
    let error = GymError::NotFound("Class not found".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_handling_conflict() {
    let error = GymError::Conflict("Email already exists".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_already_booked() {
    let error = GymError::AlreadyBooked("Seat already held".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_class_full() {
    let error = GymError::ClassFull("No seats left".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_forbidden() {
    let error = GymError::Forbidden("Not your booking".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_handling_unauthorized() {
    let error = GymError::Unauthorized("Invalid password".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_error_handling_validation() {
    let error = GymError::Validation("Invalid input".to_string());
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_database_masks_details() {
    let error = GymError::Database(eyre::eyre!("connection refused on 10.0.0.7:5432"));
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Backend details never reach the response body
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("connection refused"));
    assert!(!text.contains("10.0.0.7"));
    assert!(text.contains("unexpected error"));
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = GymError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_hash_password() {
    // Test that password hashing works
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    // Verify the hash is different from the original password
    assert_ne!(hashed, password);

    // Verify the hash starts with the argon2 prefix
    assert!(hashed.starts_with("$argon2"));
}

#[tokio::test]
async fn test_verify_password_round_trip() {
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    assert!(auth::verify_password(password, &hashed));
    assert!(!auth::verify_password("wrong_password", &hashed));
}

#[tokio::test]
async fn test_verify_password_malformed_hash_is_false() {
    // A corrupt stored hash must read as "no match", not an error
    assert!(!auth::verify_password("anything", "not-a-phc-string"));
    assert!(!auth::verify_password("anything", ""));
}

#[test]
fn test_generate_session_token_shape() {
    let token = auth::generate_session_token();
    assert_eq!(token.len(), 48);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two tokens should not collide
    assert_ne!(token, auth::generate_session_token());
}

#[test]
fn test_bearer_token_extraction() {
    let mut headers = HeaderMap::new();
    assert_eq!(auth::bearer_token(&headers), None);

    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer abc123"),
    );
    assert_eq!(auth::bearer_token(&headers), Some("abc123".to_string()));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(auth::bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(auth::bearer_token(&headers), None);
}
