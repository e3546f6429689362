//! Post entity model and DTOs.

use cnfs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub content: String,
    pub user_identity_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub content: String,
    pub user_identity_id: DbId,
}

/// DTO for updating a post.
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub content: String,
}
