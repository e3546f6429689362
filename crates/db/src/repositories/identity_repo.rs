//! Repository for the `user_identities` table.
//!
//! Identities are inserted together with their user by
//! [`UserRepo::create_with_identity`](super::UserRepo::create_with_identity)
//! and never modified afterwards, so this repository is read-only.

use cnfs_core::types::DbId;
use sqlx::PgPool;

use crate::models::identity::UserIdentity;

pub struct IdentityRepo;

impl IdentityRepo {
    /// Find the identity mapped to a user id.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserIdentity>, sqlx::Error> {
        sqlx::query_as::<_, UserIdentity>(
            "SELECT id, user_id, identity_hash FROM user_identities WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
