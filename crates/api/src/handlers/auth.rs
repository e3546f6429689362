//! Handlers for the `/auth` resource (login, refresh, validate, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cnfs_core::error::CoreError;
use cnfs_core::types::{DbId, Timestamp};
use cnfs_core::validation::{validate_request, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use cnfs_db::models::user::UserResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::token::Payload;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::RequestClient;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
}

/// Request body carrying a refresh token (`/auth/refresh`, `/auth/logout`).
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub access_token: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: DbId,
    pub access_token: String,
    pub access_token_expires_at: Timestamp,
    pub refresh_token: String,
    pub refresh_token_expires_at: Timestamp,
    pub user: UserResponse,
}

/// Successful refresh response. The refresh token itself is unchanged.
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: Timestamp,
}

/// Result of `DELETE /auth/sessions`.
#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth
///
/// Authenticate with username + password. Opens a session and returns an
/// access and a refresh token.
pub async fn login(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    validate_request(&input)?;

    let outcome = state
        .sessions
        .login(state.store.as_ref(), &input.username, &input.password, client)
        .await
        .map_err(|e| match e {
            CoreError::NotFound { .. } | CoreError::Mismatch => {
                tracing::info!(username = %input.username, "Login rejected");
                AppError::InvalidCredentials
            }
            other => AppError::Core(other),
        })?;

    Ok(Json(DataResponse {
        data: LoginResponse {
            session_id: outcome.session_id,
            access_token_expires_at: outcome.access.expires_at(),
            access_token: outcome.access.token,
            refresh_token_expires_at: outcome.refresh.expires_at(),
            refresh_token: outcome.refresh.token,
            user: outcome.user.into(),
        },
    }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AccessTokenResponse>>> {
    let access = state
        .sessions
        .refresh(state.store.as_ref(), &input.refresh_token)
        .await?;

    Ok(Json(DataResponse {
        data: AccessTokenResponse {
            access_token_expires_at: access.expires_at(),
            access_token: access.token,
        },
    }))
}

/// POST /api/v1/auth/validate
///
/// Verify an access token and return its payload.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<ValidateRequest>,
) -> AppResult<Json<DataResponse<Payload>>> {
    let payload = state.sessions.validate(&input.access_token)?;
    Ok(Json(DataResponse { data: payload }))
}

/// POST /api/v1/auth/logout
///
/// Delete the session behind the presented refresh token. Returns 204.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<StatusCode> {
    state
        .sessions
        .logout_token(state.store.as_ref(), &input.refresh_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/auth/sessions
///
/// Revoke every session of the authenticated user.
pub async fn revoke_sessions(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
) -> AppResult<Json<DataResponse<RevokeResponse>>> {
    let revoked = state
        .sessions
        .revoke_all(state.store.as_ref(), payload.user_id)
        .await?;
    Ok(Json(DataResponse {
        data: RevokeResponse { revoked },
    }))
}
