//! Domain primitives shared by the `cnfs` crates.
//!
//! - [`types`] -- id and timestamp aliases.
//! - [`error`] -- domain and configuration error enums.
//! - [`pagination`] -- limit and offset bounds for list queries.
//! - [`validation`] -- input rules for usernames, passwords and content.

pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;
