//! Route definitions for the `/auth` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /           -> login
/// POST   /refresh    -> refresh
/// POST   /validate   -> validate
/// POST   /logout     -> logout
/// DELETE /sessions   -> revoke_sessions (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/validate", post(auth::validate))
        .route("/logout", post(auth::logout))
        .route("/sessions", delete(auth::revoke_sessions))
}
