//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts (and an update DTO where rows are mutable)

pub mod comment;
pub mod identity;
pub mod message;
pub mod post;
pub mod session;
pub mod user;
