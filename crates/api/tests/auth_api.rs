//! HTTP-level integration tests for signup, login, refresh, validate,
//! logout and session revocation.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, Request, StatusCode};
use cnfs_api::auth::token::TokenMaker;
use cnfs_core::types::DbId;
use cnfs_db::store::SessionStore;
use common::{
    body_json, build_test_app, delete_auth, get_auth, login, patch_json_auth, post_json,
    put_json_auth, signup, signup_and_login, str_field,
};
use serde_json::json;
use tower::ServiceExt;

fn id_of(json: &serde_json::Value, field: &str) -> DbId {
    str_field(json, field).parse().expect("field should be a uuid")
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_signup_returns_user_without_password() {
    let app = build_test_app();
    let user = signup(&app, "alice", "secret").await;

    assert_eq!(user["username"], "alice");
    assert!(user["id"].is_string());
    assert!(user.get("password").is_none(), "password hash must never be serialized");
}

#[tokio::test]
async fn test_signup_duplicate_username_conflicts() {
    let app = build_test_app();
    signup(&app, "alice", "secret").await;

    let response = post_json(
        app.app(),
        "/api/v1/users",
        json!({ "username": "alice", "password": "other" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_rejects_overlong_username() {
    let app = build_test_app();
    let response = post_json(
        app.app(),
        "/api/v1/users",
        json!({ "username": "a".repeat(21), "password": "secret" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_returns_both_tokens_and_one_session() {
    let app = build_test_app();
    let (user, login) = signup_and_login(&app, "alice", "secret").await;

    let access = str_field(&login, "access_token");
    let refresh = str_field(&login, "refresh_token");
    assert_ne!(access, refresh);
    assert_eq!(login["user"]["username"], "alice");

    let maker = app.state.sessions.maker();
    let access_payload = maker.verify_token(access).unwrap();
    let refresh_payload = maker.verify_token(refresh).unwrap();
    assert_ne!(access_payload.id, refresh_payload.id);
    assert_eq!(id_of(&login, "session_id"), refresh_payload.id);

    let user_id = id_of(&user, "id");
    assert_eq!(app.store.session_count(user_id).await, 1);
}

#[tokio::test]
async fn test_login_unknown_user_and_wrong_password_look_the_same() {
    let app = build_test_app();
    signup(&app, "alice", "secret").await;

    let unknown = post_json(
        app.app(),
        "/api/v1/auth",
        json!({ "username": "nobody", "password": "secret" }),
    )
    .await;
    let wrong = post_json(
        app.app(),
        "/api/v1/auth",
        json!({ "username": "alice", "password": "wrong" }),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_refresh_returns_new_access_token_only() {
    let app = build_test_app();
    let (_, login) = signup_and_login(&app, "alice", "secret").await;
    let refresh = str_field(&login, "refresh_token");

    let response = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    let new_access = str_field(&data, "access_token");
    assert_ne!(new_access, str_field(&login, "access_token"));
    assert!(data.get("refresh_token").is_none());

    // The original refresh token keeps working.
    let again = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_garbage_is_invalid_token() {
    let app = build_test_app();
    let response = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": "garbage" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_refresh_of_blocked_session_is_rejected() {
    let app = build_test_app();
    let (_, login) = signup_and_login(&app, "alice", "secret").await;

    app.state
        .sessions
        .block(app.store.as_ref(), id_of(&login, "session_id"))
        .await
        .unwrap();

    let response = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": str_field(&login, "refresh_token") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "SESSION_BLOCKED");
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_validate_returns_payload() {
    let app = build_test_app();
    let (user, login) = signup_and_login(&app, "alice", "secret").await;

    let response = post_json(
        app.app(),
        "/api/v1/auth/validate",
        json!({ "access_token": str_field(&login, "access_token") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["user_id"], user["id"]);
    assert_eq!(data["username"], "alice");
    assert!(data["expired_at"].is_string());
}

// ---------------------------------------------------------------------------
// Logout and revocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_logout_deletes_only_that_session() {
    let app = build_test_app();
    let (user, first) = signup_and_login(&app, "alice", "secret").await;
    let second = login(&app, "alice", "secret").await;
    let user_id = id_of(&user, "id");
    assert_eq!(app.store.session_count(user_id).await, 2);

    let body = json!({ "refresh_token": str_field(&first, "refresh_token") });
    let response = post_json(app.app(), "/api/v1/auth/logout", body.clone()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.store.session_count(user_id).await, 1);
    assert!(app
        .store
        .get_session(id_of(&second, "session_id"))
        .await
        .is_ok());

    let repeat = post_json(app.app(), "/api/v1/auth/logout", body).await;
    assert_eq!(repeat.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_sessions_clears_all_of_the_callers_sessions() {
    let app = build_test_app();
    let (alice, login_a) = signup_and_login(&app, "alice", "secret").await;
    login(&app, "alice", "secret").await;
    let (bob, _) = signup_and_login(&app, "bob", "secret").await;

    let token = str_field(&login_a, "access_token");
    let response = delete_auth(app.app(), "/api/v1/auth/sessions", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["revoked"], 2);

    assert_eq!(app.store.session_count(id_of(&alice, "id")).await, 0);
    assert_eq!(app.store.session_count(id_of(&bob, "id")).await, 1);

    // The access token is still cryptographically valid, but nothing is left.
    let again = delete_auth(app.app(), "/api/v1/auth/sessions", token).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_after_revocation_is_not_found() {
    let app = build_test_app();
    let (_, login) = signup_and_login(&app, "alice", "secret").await;

    delete_auth(
        app.app(),
        "/api/v1/auth/sessions",
        str_field(&login, "access_token"),
    )
    .await;

    let response = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": str_field(&login, "refresh_token") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bearer authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_me_requires_a_bearer_token() {
    let app = build_test_app();
    let (user, login) = signup_and_login(&app, "alice", "secret").await;

    let response = get_auth(app.app(), "/api/v1/users/me", str_field(&login, "access_token")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], user["id"]);

    let anonymous = common::get(app.app(), "/api/v1/users/me").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(anonymous).await["code"], "UNAUTHORIZED");

    let forged = get_auth(app.app(), "/api/v1/users/me", "not-a-token").await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(forged).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_non_ascii_authorization_header_is_malformed() {
    let app = build_test_app();
    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer caf\xe9").unwrap(),
        )
        .body(Body::empty())
        .unwrap();

    let response = app.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Malformed Authorization header");
}

// ---------------------------------------------------------------------------
// Account management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_change_password_revokes_sessions() {
    let app = build_test_app();
    let (user, login_resp) = signup_and_login(&app, "alice", "secret").await;
    let token = str_field(&login_resp, "access_token");

    let wrong = put_json_auth(
        app.app(),
        "/api/v1/users/me/password",
        json!({ "current_password": "nope", "new_password": "better" }),
        token,
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let response = put_json_auth(
        app.app(),
        "/api/v1/users/me/password",
        json!({ "current_password": "secret", "new_password": "better" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.session_count(id_of(&user, "id")).await, 0);

    let old = post_json(
        app.app(),
        "/api/v1/auth",
        json!({ "username": "alice", "password": "secret" }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    login(&app, "alice", "better").await;
}

#[tokio::test]
async fn test_delete_account_removes_user_and_sessions() {
    let app = build_test_app();
    let (user, login_resp) = signup_and_login(&app, "alice", "secret").await;
    let token = str_field(&login_resp, "access_token");

    let response = delete_auth(app.app(), "/api/v1/users/me", token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.session_count(id_of(&user, "id")).await, 0);

    let me = get_auth(app.app(), "/api/v1/users/me", token).await;
    assert_eq!(me.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_username_revokes_sessions() {
    let app = build_test_app();
    let (user, login_resp) = signup_and_login(&app, "alice", "secret").await;
    let token = str_field(&login_resp, "access_token");

    let response = patch_json_auth(
        app.app(),
        "/api/v1/users/me/username",
        json!({ "username": "alicia" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "alicia");
    assert_eq!(app.store.session_count(id_of(&user, "id")).await, 0);

    let refresh = post_json(
        app.app(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": str_field(&login_resp, "refresh_token") }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::NOT_FOUND);

    login(&app, "alicia", "secret").await;
}

#[tokio::test]
async fn test_change_username_to_taken_name_conflicts() {
    let app = build_test_app();
    let (user, login_resp) = signup_and_login(&app, "alice", "secret").await;
    signup(&app, "bob", "secret").await;

    let response = patch_json_auth(
        app.app(),
        "/api/v1/users/me/username",
        json!({ "username": "bob" }),
        str_field(&login_resp, "access_token"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.store.session_count(id_of(&user, "id")).await, 1);
}
