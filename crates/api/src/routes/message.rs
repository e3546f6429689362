//! Route definitions for the `/messages` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::message;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST   /       -> send
/// GET    /{id}   -> get_by_id (receiver only)
/// DELETE /{id}   -> delete (receiver only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(message::send))
        .route("/{id}", get(message::get_by_id).delete(message::delete))
}
