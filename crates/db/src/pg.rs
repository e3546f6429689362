//! PostgreSQL implementation of the [`Store`] contract.
//!
//! Every round trip runs under `tokio::time::timeout`. When the deadline
//! elapses the query future is dropped (sqlx aborts the statement and any open
//! transaction rolls back) and the caller sees [`StoreError::Timeout`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use cnfs_core::types::DbId;

use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::identity::UserIdentity;
use crate::models::message::{CreateMessage, Message};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    CommentRepo, IdentityRepo, MessageRepo, PostRepo, SessionRepo, UserRepo,
};
use crate::store::{
    ContentStore, IdentityStore, SessionStore, Store, StoreError, StoreResult, UserStore,
};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Store backed by a sqlx connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    query_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Await `fut` under the configured deadline and classify its error.
    async fn run<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(classify_sqlx_error),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "Store operation timed out"
                );
                Err(StoreError::Timeout)
            }
        }
    }
}

/// Map constraint violations onto contract errors; everything else stays a
/// database error.
fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::NotFound {
                    entity: entity_for_foreign_key(constraint),
                };
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Name the referenced entity of a default-named foreign key constraint.
fn entity_for_foreign_key(constraint: &str) -> &'static str {
    if constraint.ends_with("post_id_fkey") {
        "Post"
    } else if constraint.ends_with("user_identity_id_fkey") {
        "Identity"
    } else if constraint.ends_with("receiver_id_fkey") || constraint.ends_with("user_id_fkey") {
        "User"
    } else {
        "Resource"
    }
}

fn found<T>(row: Option<T>, entity: &'static str) -> StoreResult<T> {
    row.ok_or(StoreError::NotFound { entity })
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, input: &CreateSession) -> StoreResult<Session> {
        self.run(SessionRepo::create(&self.pool, input)).await
    }

    async fn get_session(&self, id: DbId) -> StoreResult<Session> {
        found(self.run(SessionRepo::find_by_id(&self.pool, id)).await?, "Session")
    }

    async fn block_session(&self, id: DbId) -> StoreResult<()> {
        if self.run(SessionRepo::block(&self.pool, id)).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound { entity: "Session" })
        }
    }

    async fn delete_session(&self, id: DbId) -> StoreResult<DbId> {
        found(self.run(SessionRepo::delete(&self.pool, id)).await?, "Session")
    }

    async fn delete_sessions_by_user(&self, user_id: DbId) -> StoreResult<Vec<DbId>> {
        let ids = self
            .run(SessionRepo::delete_all_for_user(&self.pool, user_id))
            .await?;
        if ids.is_empty() {
            return Err(StoreError::NotFound { entity: "Session" });
        }
        Ok(ids)
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn get_identity_by_user(&self, user_id: DbId) -> StoreResult<UserIdentity> {
        found(
            self.run(IdentityRepo::find_by_user_id(&self.pool, user_id))
                .await?,
            "Identity",
        )
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<(User, UserIdentity)> {
        self.run(UserRepo::create_with_identity(&self.pool, input))
            .await
    }

    async fn get_user(&self, id: DbId) -> StoreResult<User> {
        found(self.run(UserRepo::find_by_id(&self.pool, id)).await?, "User")
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        found(
            self.run(UserRepo::find_by_username(&self.pool, username))
                .await?,
            "User",
        )
    }

    async fn update_username(&self, id: DbId, username: &str) -> StoreResult<User> {
        found(
            self.run(UserRepo::update_username(&self.pool, id, username))
                .await?,
            "User",
        )
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> StoreResult<()> {
        if self
            .run(UserRepo::update_password(&self.pool, id, password_hash))
            .await?
        {
            Ok(())
        } else {
            Err(StoreError::NotFound { entity: "User" })
        }
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<DbId> {
        found(self.run(UserRepo::delete(&self.pool, id)).await?, "User")
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn create_post(&self, input: &CreatePost) -> StoreResult<Post> {
        self.run(PostRepo::create(&self.pool, input)).await
    }

    async fn get_post(&self, id: DbId) -> StoreResult<Post> {
        found(self.run(PostRepo::find_by_id(&self.pool, id)).await?, "Post")
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>> {
        self.run(PostRepo::list(&self.pool, limit, offset)).await
    }

    async fn update_post(&self, id: DbId, input: &UpdatePost) -> StoreResult<Post> {
        found(self.run(PostRepo::update(&self.pool, id, input)).await?, "Post")
    }

    async fn delete_post(&self, id: DbId) -> StoreResult<Post> {
        found(self.run(PostRepo::delete(&self.pool, id)).await?, "Post")
    }

    async fn create_comment(&self, input: &CreateComment) -> StoreResult<Comment> {
        self.run(CommentRepo::create(&self.pool, input)).await
    }

    async fn get_comment(&self, id: DbId) -> StoreResult<Comment> {
        found(self.run(CommentRepo::find_by_id(&self.pool, id)).await?, "Comment")
    }

    async fn list_comments_by_post(&self, post_id: DbId) -> StoreResult<Vec<Comment>> {
        self.get_post(post_id).await?;
        self.run(CommentRepo::list_by_post(&self.pool, post_id))
            .await
    }

    async fn update_comment(&self, id: DbId, input: &UpdateComment) -> StoreResult<Comment> {
        found(
            self.run(CommentRepo::update(&self.pool, id, input)).await?,
            "Comment",
        )
    }

    async fn delete_comment(&self, id: DbId) -> StoreResult<Comment> {
        found(self.run(CommentRepo::delete(&self.pool, id)).await?, "Comment")
    }

    async fn create_message(&self, input: &CreateMessage) -> StoreResult<Message> {
        self.run(MessageRepo::create(&self.pool, input)).await
    }

    async fn get_message(&self, id: DbId) -> StoreResult<Message> {
        found(self.run(MessageRepo::find_by_id(&self.pool, id)).await?, "Message")
    }

    async fn list_messages_by_receiver(
        &self,
        receiver_id: DbId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Message>> {
        self.run(MessageRepo::list_by_receiver(
            &self.pool,
            receiver_id,
            limit,
            offset,
        ))
        .await
    }

    async fn mark_message_seen(&self, id: DbId) -> StoreResult<Message> {
        found(self.run(MessageRepo::mark_seen(&self.pool, id)).await?, "Message")
    }

    async fn delete_message(&self, id: DbId) -> StoreResult<Message> {
        found(self.run(MessageRepo::delete(&self.pool, id)).await?, "Message")
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.run(crate::health_check(&self.pool)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_foreign_keys_name_the_referenced_entity() {
        assert_eq!(entity_for_foreign_key("comments_post_id_fkey"), "Post");
        assert_eq!(entity_for_foreign_key("messages_receiver_id_fkey"), "User");
        assert_eq!(
            entity_for_foreign_key("posts_user_identity_id_fkey"),
            "Identity"
        );
        assert_eq!(entity_for_foreign_key("something_else"), "Resource");
    }

    #[test]
    fn test_row_not_found_stays_a_database_error() {
        assert_matches!(
            classify_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Database(sqlx::Error::RowNotFound)
        );
    }

    #[tokio::test]
    async fn test_elapsed_deadline_surfaces_timeout() {
        // `connect_lazy` never touches the network until a query runs.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        let store = PgStore::new(pool, Duration::from_millis(10));

        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, sqlx::Error>(())
        };
        assert_matches!(store.run(slow).await, Err(StoreError::Timeout));
    }
}
