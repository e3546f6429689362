//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Verified token payload from a Bearer `Authorization` header.
//! - [`client::RequestClient`] -- User agent and client IP recorded on new sessions.

pub mod auth;
pub mod client;
