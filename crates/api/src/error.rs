use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cnfs_core::error::CoreError;
use cnfs_db::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cnfs_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Login failed. Unknown user and wrong password are deliberately
    /// indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Core(err.into())
    }
}

impl AppError {
    /// Status, machine-readable code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a domain error onto an HTTP status and error code.
///
/// Every authentication failure is 401 but keeps its own code, so clients
/// can tell a blocked session from an expired one.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let unauthorized = |code: &'static str| (StatusCode::UNAUTHORIZED, code, err.to_string());
    match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Mismatch => unauthorized("PASSWORD_MISMATCH"),
        CoreError::SubjectMismatch => unauthorized("SUBJECT_MISMATCH"),
        CoreError::TokenMismatch => unauthorized("TOKEN_MISMATCH"),
        CoreError::Expired => unauthorized("TOKEN_EXPIRED"),
        CoreError::Blocked => unauthorized("SESSION_BLOCKED"),
        CoreError::InvalidSignature => unauthorized("INVALID_TOKEN"),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}
