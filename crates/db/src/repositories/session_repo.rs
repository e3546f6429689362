//! Repository for the `sessions` table.

use cnfs_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, username, refresh_token, user_agent, client_ip, \
                        is_blocked, created_at, expires_at";

/// Provides the session query contract: insert, lookup, block, delete.
///
/// Rows are never updated apart from the `is_blocked` flag.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (id, user_id, username, refresh_token, user_agent, client_ip, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(&input.username)
            .bind(&input.refresh_token)
            .bind(&input.user_agent)
            .bind(&input.client_ip)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by id, blocked or not, expired or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a session as blocked. Returns `true` if the row exists.
    pub async fn block(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET is_blocked = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a single session, returning its id if it existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("DELETE FROM sessions WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete every session belonging to a user, returning the deleted ids.
    pub async fn delete_all_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("DELETE FROM sessions WHERE user_id = $1 RETURNING id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
