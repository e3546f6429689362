//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values and do not need a
//! router.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use cnfs_api::error::AppError;
use cnfs_core::error::CoreError;
use cnfs_db::store::StoreError;
use http_body_util::BodyExt;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_not_found_error_returns_404() {
    let (status, json) = error_to_response(CoreError::NotFound { entity: "Post" }.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Post not found");
}

#[tokio::test]
async fn test_blocked_session_returns_401_with_its_own_code() {
    let (status, json) = error_to_response(CoreError::Blocked.into()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "SESSION_BLOCKED");
}

#[tokio::test]
async fn test_forbidden_error_returns_403() {
    let (status, json) =
        error_to_response(CoreError::Forbidden("You do not own this post".into()).into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "You do not own this post");
}

#[tokio::test]
async fn test_bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid field value".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn test_conflict_error_returns_409() {
    let (status, json) = error_to_response(CoreError::Conflict("duplicate name".into()).into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_credentials_returns_generic_401() {
    let (status, json) = error_to_response(AppError::InvalidCredentials).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert_eq!(json["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_store_timeout_returns_sanitized_500() {
    let (status, json) = error_to_response(StoreError::Timeout.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret stack trace".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
