//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use cnfs_core::error::{CoreError, CoreResult};

use crate::auth::token::{Payload, TokenMaker};
use crate::error::AppError;
use crate::state::AppState;

/// The only supported authorization scheme, compared case-insensitively.
const BEARER_SCHEME: &str = "bearer";

/// Authenticate a raw `Authorization` header value.
///
/// The value must be exactly two whitespace-separated fields,
/// `<scheme> <token>`, with scheme `bearer` in any case. The token is then
/// verified against the current time.
pub fn authenticate_request(maker: &dyn TokenMaker, header: Option<&str>) -> CoreResult<Payload> {
    let header = header
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    let fields: Vec<&str> = header.split_whitespace().collect();
    let [scheme, token] = fields.as_slice() else {
        return Err(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ));
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(CoreError::Unauthorized(format!(
            "Unsupported authorization scheme: {scheme}"
        )));
    }

    Ok(maker.verify_token(token)?)
}

/// The raw `Authorization` header, if present.
///
/// A header that is present but not visible ASCII is malformed, not missing.
fn authorization_header(parts: &Parts) -> CoreResult<Option<&str>> {
    parts
        .headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| CoreError::Unauthorized("Malformed Authorization header".into()))
        })
        .transpose()
}

/// Authenticated caller, carrying the verified token payload.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication; the request is rejected with 401 before the handler runs
/// when the header is missing, malformed or carries a bad token.
///
/// ```ignore
/// async fn my_handler(AuthUser(payload): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %payload.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Payload);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let payload = authorization_header(parts)
            .and_then(|header| authenticate_request(state.sessions.maker(), header))
            .map_err(|e| {
                tracing::debug!(error = %e, "Request authentication failed");
                AppError::Core(e)
            })?;

        Ok(AuthUser(payload))
    }
}
