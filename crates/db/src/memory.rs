//! In-process implementation of the [`Store`] contract.
//!
//! Backs the integration tests and local experimentation without a database.
//! A single `RwLock` guards all tables and every operation takes it exactly
//! once, which gives the same per-operation atomicity the relational store
//! provides. Cascades mirror the `ON DELETE CASCADE` rules of the migrations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use cnfs_core::types::DbId;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::identity::UserIdentity;
use crate::models::message::{CreateMessage, Message};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::store::{
    ContentStore, IdentityStore, SessionStore, Store, StoreError, StoreResult, UserStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<DbId, User>,
    identities: HashMap<DbId, UserIdentity>,
    sessions: HashMap<DbId, Session>,
    posts: HashMap<DbId, Post>,
    comments: HashMap<DbId, Comment>,
    messages: HashMap<DbId, Message>,
}

impl Tables {
    fn identity_for_user(&self, user_id: DbId) -> Option<&UserIdentity> {
        self.identities.values().find(|i| i.user_id == user_id)
    }
}

/// Thread-safe in-memory store. Wrap in `Arc` to share.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session row verbatim, bypassing the lifecycle manager.
    ///
    /// Lets tests stage rows that normal flows never produce (foreign
    /// subjects, past expiry).
    pub async fn put_session(&self, session: Session) {
        self.tables
            .write()
            .await
            .sessions
            .insert(session.id, session);
    }

    /// Number of stored sessions belonging to `user_id`.
    pub async fn session_count(&self, user_id: DbId) -> usize {
        self.tables
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .count()
    }
}

fn not_found<T>(entity: &'static str) -> StoreResult<T> {
    Err(StoreError::NotFound { entity })
}

/// Apply `LIMIT`/`OFFSET` semantics to an already ordered list.
fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, input: &CreateSession) -> StoreResult<Session> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&input.user_id) {
            return not_found("User");
        }
        if tables.sessions.contains_key(&input.id) {
            return Err(StoreError::Conflict(format!(
                "Duplicate value violates unique constraint: sessions_pkey ({})",
                input.id
            )));
        }
        let session = Session {
            id: input.id,
            user_id: input.user_id,
            username: input.username.clone(),
            refresh_token: input.refresh_token.clone(),
            user_agent: input.user_agent.clone(),
            client_ip: input.client_ip.clone(),
            is_blocked: false,
            created_at: Utc::now(),
            expires_at: input.expires_at,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: DbId) -> StoreResult<Session> {
        match self.tables.read().await.sessions.get(&id) {
            Some(session) => Ok(session.clone()),
            None => not_found("Session"),
        }
    }

    async fn block_session(&self, id: DbId) -> StoreResult<()> {
        match self.tables.write().await.sessions.get_mut(&id) {
            Some(session) => {
                session.is_blocked = true;
                Ok(())
            }
            None => not_found("Session"),
        }
    }

    async fn delete_session(&self, id: DbId) -> StoreResult<DbId> {
        match self.tables.write().await.sessions.remove(&id) {
            Some(session) => Ok(session.id),
            None => not_found("Session"),
        }
    }

    async fn delete_sessions_by_user(&self, user_id: DbId) -> StoreResult<Vec<DbId>> {
        let mut tables = self.tables.write().await;
        let ids: Vec<DbId> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        if ids.is_empty() {
            return not_found("Session");
        }
        for id in &ids {
            tables.sessions.remove(id);
        }
        Ok(ids)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn get_identity_by_user(&self, user_id: DbId) -> StoreResult<UserIdentity> {
        match self.tables.read().await.identity_for_user(user_id) {
            Some(identity) => Ok(identity.clone()),
            None => not_found("Identity"),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<(User, UserIdentity)> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_username".into(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username.clone(),
            password: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        let identity = UserIdentity {
            id: Uuid::new_v4(),
            user_id: user.id,
            identity_hash: Uuid::new_v4(),
        };
        tables.users.insert(user.id, user.clone());
        tables.identities.insert(identity.id, identity.clone());
        Ok((user, identity))
    }

    async fn get_user(&self, id: DbId) -> StoreResult<User> {
        match self.tables.read().await.users.get(&id) {
            Some(user) => Ok(user.clone()),
            None => not_found("User"),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        match self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
        {
            Some(user) => Ok(user.clone()),
            None => not_found("User"),
        }
    }

    async fn update_username(&self, id: DbId, username: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == username && u.id != id)
        {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_username".into(),
            ));
        }
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.username = username.to_string();
                user.updated_at = Utc::now();
                Ok(user.clone())
            }
            None => not_found("User"),
        }
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> StoreResult<()> {
        match self.tables.write().await.users.get_mut(&id) {
            Some(user) => {
                user.password = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(())
            }
            None => not_found("User"),
        }
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<DbId> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return not_found("User");
        }
        let identity_ids: Vec<DbId> = tables
            .identities
            .values()
            .filter(|i| i.user_id == id)
            .map(|i| i.id)
            .collect();
        tables.identities.retain(|_, i| i.user_id != id);
        tables.sessions.retain(|_, s| s.user_id != id);
        tables.messages.retain(|_, m| m.receiver_id != id);
        tables
            .posts
            .retain(|_, p| !identity_ids.contains(&p.user_identity_id));
        let remaining_posts: Vec<DbId> = tables.posts.keys().copied().collect();
        tables.comments.retain(|_, c| {
            !identity_ids.contains(&c.user_identity_id) && remaining_posts.contains(&c.post_id)
        });
        Ok(id)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_post(&self, input: &CreatePost) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        if !tables.identities.contains_key(&input.user_identity_id) {
            return not_found("Identity");
        }
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            content: input.content.clone(),
            user_identity_id: input.user_identity_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: DbId) -> StoreResult<Post> {
        match self.tables.read().await.posts.get(&id) {
            Some(post) => Ok(post.clone()),
            None => not_found("Post"),
        }
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page(posts, limit, offset))
    }

    async fn update_post(&self, id: DbId, input: &UpdatePost) -> StoreResult<Post> {
        match self.tables.write().await.posts.get_mut(&id) {
            Some(post) => {
                post.content = input.content.clone();
                post.updated_at = Utc::now();
                Ok(post.clone())
            }
            None => not_found("Post"),
        }
    }

    async fn delete_post(&self, id: DbId) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        match tables.posts.remove(&id) {
            Some(post) => {
                tables.comments.retain(|_, c| c.post_id != id);
                Ok(post)
            }
            None => not_found("Post"),
        }
    }

    async fn create_comment(&self, input: &CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&input.post_id) {
            return not_found("Post");
        }
        if !tables.identities.contains_key(&input.user_identity_id) {
            return not_found("Identity");
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        let comment = Comment {
            id,
            post_id: input.post_id,
            content: input.content.clone(),
            user_identity_id: input.user_identity_id,
            parent_id: input.parent_id.unwrap_or(id),
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: DbId) -> StoreResult<Comment> {
        match self.tables.read().await.comments.get(&id) {
            Some(comment) => Ok(comment.clone()),
            None => not_found("Comment"),
        }
    }

    async fn list_comments_by_post(&self, post_id: DbId) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        if !tables.posts.contains_key(&post_id) {
            return not_found("Post");
        }
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn update_comment(&self, id: DbId, input: &UpdateComment) -> StoreResult<Comment> {
        match self.tables.write().await.comments.get_mut(&id) {
            Some(comment) => {
                comment.content = input.content.clone();
                comment.updated_at = Utc::now();
                Ok(comment.clone())
            }
            None => not_found("Comment"),
        }
    }

    async fn delete_comment(&self, id: DbId) -> StoreResult<Comment> {
        match self.tables.write().await.comments.remove(&id) {
            Some(comment) => Ok(comment),
            None => not_found("Comment"),
        }
    }

    async fn create_message(&self, input: &CreateMessage) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&input.receiver_id) {
            return not_found("User");
        }
        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            receiver_id: input.receiver_id,
            content: input.content.clone(),
            seen: false,
            created_at: now,
            updated_at: now,
        };
        tables.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_message(&self, id: DbId) -> StoreResult<Message> {
        match self.tables.read().await.messages.get(&id) {
            Some(message) => Ok(message.clone()),
            None => not_found("Message"),
        }
    }

    async fn list_messages_by_receiver(
        &self,
        receiver_id: DbId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| m.receiver_id == receiver_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page(messages, limit, offset))
    }

    async fn mark_message_seen(&self, id: DbId) -> StoreResult<Message> {
        match self.tables.write().await.messages.get_mut(&id) {
            Some(message) => {
                message.seen = true;
                message.updated_at = Utc::now();
                Ok(message.clone())
            }
            None => not_found("Message"),
        }
    }

    async fn delete_message(&self, id: DbId) -> StoreResult<Message> {
        match self.tables.write().await.messages.remove(&id) {
            Some(message) => Ok(message),
            None => not_found("Message"),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
