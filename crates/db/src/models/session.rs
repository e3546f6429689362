//! Session model and DTOs.

use cnfs_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// `id` is the id of the refresh token that created the session, so a
/// verified refresh payload addresses its session directly.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating a new session. Sessions always start unblocked.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub expires_at: Timestamp,
}
