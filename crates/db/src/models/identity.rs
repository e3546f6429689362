//! Anonymized identity attached 1:1 to a user.
//!
//! Content rows reference `user_identities.id`, never `users.id`.

use cnfs_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_identities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserIdentity {
    pub id: DbId,
    pub user_id: DbId,
    pub identity_hash: DbId,
}
