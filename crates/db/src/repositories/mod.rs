//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Lookups return `Option` and leave the
//! "not found" decision to the caller.

pub mod comment_repo;
pub mod identity_repo;
pub mod message_repo;
pub mod post_repo;
pub mod session_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use identity_repo::IdentityRepo;
pub use message_repo::MessageRepo;
pub use post_repo::PostRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
