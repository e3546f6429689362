//! Comment entity model and DTOs.

use cnfs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
///
/// Top-level comments carry their own id in `parent_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub content: String,
    pub user_identity_id: DbId,
    pub parent_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a comment.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub post_id: DbId,
    pub content: String,
    pub user_identity_id: DbId,
    /// `None` makes this a top-level comment.
    pub parent_id: Option<DbId>,
}

/// DTO for updating a comment.
#[derive(Debug, Clone)]
pub struct UpdateComment {
    pub content: String,
}
