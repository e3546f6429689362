//! Authentication and authorization primitives.
//!
//! - [`token`] -- Signed credentials and the [`token::TokenMaker`] capability.
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`session`] -- Session lifecycle (login, refresh, logout, revocation).
//! - [`ownership`] -- Ownership checks for posts, comments and messages.

pub mod ownership;
pub mod password;
pub mod session;
pub mod token;
