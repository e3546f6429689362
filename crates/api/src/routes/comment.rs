//! Route definitions for the `/comments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comment;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /       -> create (requires auth)
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update (owner only)
/// DELETE /{id}   -> delete (owner only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(comment::create)).route(
        "/{id}",
        get(comment::get_by_id)
            .put(comment::update)
            .delete(comment::delete),
    )
}
