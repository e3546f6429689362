//! Handlers for the `/messages` resource.
//!
//! Anyone may send a message to a user; only the receiver can read or
//! delete it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cnfs_core::types::DbId;
use cnfs_core::validation::{validate_request, MAX_CONTENT_LENGTH};
use cnfs_db::models::message::{CreateMessage, Message};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::ownership::authorize_message;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /messages`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub receiver_id: DbId,
    #[validate(length(min = 1, max = MAX_CONTENT_LENGTH))]
    pub content: String,
}

/// What the sender gets back; the content stays private to the receiver.
#[derive(Debug, Serialize)]
pub struct SentMessage {
    pub id: DbId,
    pub receiver_id: DbId,
}

/// POST /api/v1/messages
pub async fn send(
    State(state): State<AppState>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SentMessage>>)> {
    validate_request(&input)?;

    let message = state
        .store
        .create_message(&CreateMessage {
            receiver_id: input.receiver_id,
            content: input.content,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SentMessage {
                id: message.id,
                receiver_id: message.receiver_id,
            },
        }),
    ))
}

/// GET /api/v1/users/me/messages
///
/// The caller's inbox, newest first. Listing does not mark anything seen.
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let (limit, offset) = params.bounds();
    let messages = state
        .store
        .list_messages_by_receiver(payload.user_id, limit, offset)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// GET /api/v1/messages/{id}
///
/// Reading a message marks it as seen.
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Message>>> {
    let message = authorize_message(state.store.as_ref(), &payload, id).await?;
    let message = if message.seen {
        message
    } else {
        state.store.mark_message_seen(id).await?
    };
    Ok(Json(DataResponse { data: message }))
}

/// DELETE /api/v1/messages/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_message(state.store.as_ref(), &payload, id).await?;
    state.store.delete_message(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
