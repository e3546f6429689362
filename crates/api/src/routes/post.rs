//! Route definitions for the `/posts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::post as handlers;
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create (requires auth)
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update (owner only)
/// DELETE /{id}            -> delete (owner only)
/// GET    /{id}/comments   -> list_comments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list).post(handlers::create))
        .route(
            "/{id}",
            get(handlers::get_by_id)
                .patch(handlers::update)
                .delete(handlers::delete),
        )
        .route("/{id}/comments", get(handlers::list_comments))
}
