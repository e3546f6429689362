//! Query contract consumed by the authentication and ownership layers.
//!
//! The traits are narrow on purpose: every method maps to one atomic
//! statement (or, for signup, one transaction). Two implementations exist:
//! [`PgStore`](crate::pg::PgStore) for production and
//! [`MemoryStore`](crate::memory::MemoryStore) for tests and local runs.

use async_trait::async_trait;
use cnfs_core::error::CoreError;
use cnfs_core::types::DbId;

use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::identity::UserIdentity;
use crate::models::message::{CreateMessage, Message};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};

/// Failure of a single store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The round trip exceeded the configured query timeout and was aborted.
    #[error("store operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => CoreError::NotFound { entity },
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::Timeout => CoreError::Internal("store operation timed out".into()),
            StoreError::Database(e) => CoreError::Internal(format!("database error: {e}")),
        }
    }
}

/// Persisted refresh-token sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, input: &CreateSession) -> StoreResult<Session>;

    async fn get_session(&self, id: DbId) -> StoreResult<Session>;

    /// Set `is_blocked = true`. The only in-place mutation a session allows.
    async fn block_session(&self, id: DbId) -> StoreResult<()>;

    /// Delete one session, returning its id.
    async fn delete_session(&self, id: DbId) -> StoreResult<DbId>;

    /// Delete every session of a user. `NotFound` when the user had none.
    async fn delete_sessions_by_user(&self, user_id: DbId) -> StoreResult<Vec<DbId>>;
}

/// The user id -> anonymized identity mapping.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_identity_by_user(&self, user_id: DbId) -> StoreResult<UserIdentity>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user together with its identity. `Conflict` if the username is taken.
    async fn create_user(&self, input: &CreateUser) -> StoreResult<(User, UserIdentity)>;

    async fn get_user(&self, id: DbId) -> StoreResult<User>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User>;

    /// `Conflict` if another user already has `username`.
    async fn update_username(&self, id: DbId, username: &str) -> StoreResult<User>;

    async fn update_password(&self, id: DbId, password_hash: &str) -> StoreResult<()>;

    /// Delete a user; identity, sessions, content and messages go with it.
    async fn delete_user(&self, id: DbId) -> StoreResult<DbId>;
}

/// Posts, comments and messages.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_post(&self, input: &CreatePost) -> StoreResult<Post>;
    async fn get_post(&self, id: DbId) -> StoreResult<Post>;
    /// Newest first.
    async fn list_posts(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>>;
    async fn update_post(&self, id: DbId, input: &UpdatePost) -> StoreResult<Post>;
    async fn delete_post(&self, id: DbId) -> StoreResult<Post>;

    /// `NotFound` for `Post` when the target post does not exist.
    async fn create_comment(&self, input: &CreateComment) -> StoreResult<Comment>;
    async fn get_comment(&self, id: DbId) -> StoreResult<Comment>;
    /// Oldest first. `NotFound` for `Post` when the post does not exist.
    async fn list_comments_by_post(&self, post_id: DbId) -> StoreResult<Vec<Comment>>;
    async fn update_comment(&self, id: DbId, input: &UpdateComment) -> StoreResult<Comment>;
    async fn delete_comment(&self, id: DbId) -> StoreResult<Comment>;

    /// `NotFound` for `User` when the receiver does not exist.
    async fn create_message(&self, input: &CreateMessage) -> StoreResult<Message>;
    async fn get_message(&self, id: DbId) -> StoreResult<Message>;
    /// Newest first.
    async fn list_messages_by_receiver(
        &self,
        receiver_id: DbId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Message>>;
    async fn mark_message_seen(&self, id: DbId) -> StoreResult<Message>;
    async fn delete_message(&self, id: DbId) -> StoreResult<Message>;
}

/// Everything the API needs from persistence.
#[async_trait]
pub trait Store: UserStore + IdentityStore + SessionStore + ContentStore + 'static {
    /// Cheap liveness check used by `/health`.
    async fn health_check(&self) -> StoreResult<()>;
}
