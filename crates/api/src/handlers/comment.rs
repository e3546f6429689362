//! Handlers for the `/comments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cnfs_core::error::CoreError;
use cnfs_core::types::DbId;
use cnfs_core::validation::{validate_request, MAX_CONTENT_LENGTH};
use cnfs_db::models::comment::{Comment, CreateComment, UpdateComment};
use serde::Deserialize;
use validator::Validate;

use crate::auth::ownership::authorize_comment;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: DbId,
    #[validate(length(min = 1, max = MAX_CONTENT_LENGTH))]
    pub content: String,
    /// Comment being replied to; omit for a top-level comment.
    #[serde(default)]
    pub parent_id: Option<DbId>,
}

/// Request body for `PUT /comments/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = MAX_CONTENT_LENGTH))]
    pub content: String,
}

/// POST /api/v1/comments
///
/// A reply's parent must exist and belong to the same post.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    validate_request(&input)?;

    if let Some(parent_id) = input.parent_id {
        let parent = state.store.get_comment(parent_id).await?;
        if parent.post_id != input.post_id {
            return Err(CoreError::Validation(
                "parent_id: must be a comment on the same post".into(),
            )
            .into());
        }
    }

    let identity = state.store.get_identity_by_user(payload.user_id).await?;
    let comment = state
        .store
        .create_comment(&CreateComment {
            post_id: input.post_id,
            content: input.content,
            user_identity_id: identity.id,
            parent_id: input.parent_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// GET /api/v1/comments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Comment>>> {
    let comment = state.store.get_comment(id).await?;
    Ok(Json(DataResponse { data: comment }))
}

/// PUT /api/v1/comments/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCommentRequest>,
) -> AppResult<Json<DataResponse<Comment>>> {
    validate_request(&input)?;

    authorize_comment(state.store.as_ref(), &payload, id).await?;
    let comment = state
        .store
        .update_comment(
            id,
            &UpdateComment {
                content: input.content,
            },
        )
        .await?;

    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_comment(state.store.as_ref(), &payload, id).await?;
    state.store.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
