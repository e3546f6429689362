//! Handlers for the `/users` resource (signup and account management).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cnfs_core::error::{CoreError, CoreResult};
use cnfs_core::types::DbId;
use cnfs_core::validation::{validate_request, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use cnfs_db::models::user::{CreateUser, UserResponse};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{check_password, hash_for_storage};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
}

/// Request body for `PUT /users/me/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    pub new_password: String,
}

/// Request body for `PATCH /users/me/username`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeUsernameRequest {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: String,
}

/// POST /api/v1/users
///
/// Create an account together with its anonymized identity.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_request(&input)?;

    let password_hash = hash_for_storage(&input.password)?;
    let (user, identity) = state
        .store
        .create_user(&CreateUser {
            username: input.username,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, identity_id = %identity.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: user.into() }),
    ))
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state.store.get_user(payload.user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PATCH /api/v1/users/me/username
///
/// Rename the account, then revoke every session: refresh tokens carry the
/// old username and must not outlive it.
pub async fn change_username(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Json(input): Json<ChangeUsernameRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_request(&input)?;

    let user = state
        .store
        .update_username(payload.user_id, &input.username)
        .await?;
    revoke_sessions_if_any(&state, user.id).await?;

    tracing::info!(user_id = %user.id, "Username changed");
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/me/password
///
/// Change the password, then revoke every session so other devices must log
/// in again. Returns 204.
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    validate_request(&input)?;

    let user = state.store.get_user(payload.user_id).await?;
    check_password(&input.current_password, &user.password)?;

    let password_hash = hash_for_storage(&input.new_password)?;
    state.store.update_password(user.id, &password_hash).await?;
    revoke_sessions_if_any(&state, user.id).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/me
///
/// Revoke all sessions and delete the account. Identity, content and
/// messages are removed with it. Returns 204.
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
) -> AppResult<StatusCode> {
    revoke_sessions_if_any(&state, payload.user_id).await?;
    state.store.delete_user(payload.user_id).await?;

    tracing::info!(user_id = %payload.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke all sessions of `user_id`; having none is not an error here.
async fn revoke_sessions_if_any(state: &AppState, user_id: DbId) -> CoreResult<()> {
    match state.sessions.revoke_all(state.store.as_ref(), user_id).await {
        Ok(_) | Err(CoreError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
