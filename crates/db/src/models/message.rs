//! Private message model and DTOs.
//!
//! Messages are addressed to a user id rather than authored by an identity,
//! so ownership is decided by `receiver_id`.

use cnfs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub receiver_id: DbId,
    pub content: String,
    pub seen: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub receiver_id: DbId,
    pub content: String,
}
