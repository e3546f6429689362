//! Route definitions for the `/users` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{message, user};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /              -> signup
/// GET    /me            -> me (requires auth)
/// DELETE /me            -> delete_account (requires auth)
/// PATCH  /me/username   -> change_username (requires auth)
/// PUT    /me/password   -> change_password (requires auth)
/// GET    /me/messages   -> message::list_mine (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::signup))
        .route("/me", get(user::me).delete(user::delete_account))
        .route("/me/username", patch(user::change_username))
        .route("/me/password", put(user::change_password))
        .route("/me/messages", get(message::list_mine))
}
