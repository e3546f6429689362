//! Ownership checks for mutating user-authored resources.
//!
//! The subject always comes from a verified [`Payload`], never from the
//! request body. Existence is checked before ownership, so a missing
//! resource is `NotFound` for every caller and only an existing resource
//! owned by someone else is `Forbidden`.

use cnfs_core::error::{CoreError, CoreResult};
use cnfs_core::types::DbId;
use cnfs_db::models::comment::Comment;
use cnfs_db::models::message::Message;
use cnfs_db::models::post::Post;
use cnfs_db::store::{ContentStore, IdentityStore};

use crate::auth::token::Payload;

/// A resource whose ownership is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Post(DbId),
    Comment(DbId),
    Message(DbId),
}

/// A resource fetched and confirmed to belong to the caller.
#[derive(Debug, Clone)]
pub enum OwnedResource {
    Post(Post),
    Comment(Comment),
    Message(Message),
}

/// Authorize `payload` against any supported resource.
pub async fn authorize_ownership<S>(
    store: &S,
    payload: &Payload,
    resource: ResourceRef,
) -> CoreResult<OwnedResource>
where
    S: IdentityStore + ContentStore + ?Sized,
{
    match resource {
        ResourceRef::Post(id) => authorize_post(store, payload, id).await.map(OwnedResource::Post),
        ResourceRef::Comment(id) => authorize_comment(store, payload, id)
            .await
            .map(OwnedResource::Comment),
        ResourceRef::Message(id) => authorize_message(store, payload, id)
            .await
            .map(OwnedResource::Message),
    }
}

/// Fetch post `id` if the caller's identity authored it.
pub async fn authorize_post<S>(store: &S, payload: &Payload, id: DbId) -> CoreResult<Post>
where
    S: IdentityStore + ContentStore + ?Sized,
{
    let identity = store.get_identity_by_user(payload.user_id).await?;
    let post = store.get_post(id).await?;
    if post.user_identity_id != identity.id {
        tracing::warn!(user_id = %payload.user_id, post_id = %id, "Ownership denied");
        return Err(CoreError::Forbidden("You do not own this post".into()));
    }
    Ok(post)
}

/// Fetch comment `id` if the caller's identity authored it.
pub async fn authorize_comment<S>(store: &S, payload: &Payload, id: DbId) -> CoreResult<Comment>
where
    S: IdentityStore + ContentStore + ?Sized,
{
    let identity = store.get_identity_by_user(payload.user_id).await?;
    let comment = store.get_comment(id).await?;
    if comment.user_identity_id != identity.id {
        tracing::warn!(user_id = %payload.user_id, comment_id = %id, "Ownership denied");
        return Err(CoreError::Forbidden("You do not own this comment".into()));
    }
    Ok(comment)
}

/// Fetch message `id` if it was sent to the caller.
pub async fn authorize_message<S>(store: &S, payload: &Payload, id: DbId) -> CoreResult<Message>
where
    S: ContentStore + ?Sized,
{
    let message = store.get_message(id).await?;
    if message.receiver_id != payload.user_id {
        tracing::warn!(user_id = %payload.user_id, message_id = %id, "Ownership denied");
        return Err(CoreError::Forbidden("You do not own this message".into()));
    }
    Ok(message)
}
