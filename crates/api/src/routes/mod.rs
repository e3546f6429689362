pub mod auth;
pub mod comment;
pub mod health;
pub mod message;
pub mod post;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth                     login (public)
/// /auth/refresh             refresh (public)
/// /auth/validate            validate access token (public)
/// /auth/logout              close the refresh token's session (public)
/// /auth/sessions            revoke all own sessions (requires auth)
///
/// /users                    signup (public)
/// /users/me                 get, delete own account (requires auth)
/// /users/me/username        change username (requires auth)
/// /users/me/password        change password (requires auth)
/// /users/me/messages        own inbox (requires auth)
///
/// /posts                    list (public), create (requires auth)
/// /posts/{id}               get (public), update, delete (owner only)
/// /posts/{id}/comments      list (public)
///
/// /comments                 create (requires auth)
/// /comments/{id}            get (public), update, delete (owner only)
///
/// /messages                 send (public)
/// /messages/{id}            get, delete (receiver only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/posts", post::router())
        .nest("/comments", comment::router())
        .nest("/messages", message::router())
}
