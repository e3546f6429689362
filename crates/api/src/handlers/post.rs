//! Handlers for the `/posts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cnfs_core::types::DbId;
use cnfs_core::validation::{validate_request, MAX_CONTENT_LENGTH};
use cnfs_db::models::comment::Comment;
use cnfs_db::models::post::{CreatePost, Post, UpdatePost};
use serde::Deserialize;
use validator::Validate;

use crate::auth::ownership::authorize_post;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for creating or editing a post.
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = MAX_CONTENT_LENGTH))]
    pub content: String,
}

/// POST /api/v1/posts
///
/// The author is the caller's identity, never a client-supplied id.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Json(input): Json<PostRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Post>>)> {
    validate_request(&input)?;

    let identity = state.store.get_identity_by_user(payload.user_id).await?;
    let post = state
        .store
        .create_post(&CreatePost {
            content: input.content,
            user_identity_id: identity.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// GET /api/v1/posts
///
/// Newest first, paged by `limit` and `offset`.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Post>>>> {
    let (limit, offset) = params.bounds();
    let posts = state.store.list_posts(limit, offset).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/posts/{id}/comments
///
/// Every comment of the post, oldest first. 404 when the post is missing.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    let comments = state.store.list_comments_by_post(id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// GET /api/v1/posts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = state.store.get_post(id).await?;
    Ok(Json(DataResponse { data: post }))
}

/// PATCH /api/v1/posts/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PostRequest>,
) -> AppResult<Json<DataResponse<Post>>> {
    validate_request(&input)?;

    authorize_post(state.store.as_ref(), &payload, id).await?;
    let post = state
        .store
        .update_post(
            id,
            &UpdatePost {
                content: input.content,
            },
        )
        .await?;

    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(payload): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_post(state.store.as_ref(), &payload, id).await?;
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
