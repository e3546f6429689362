//! Client metadata extractor.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::session::ClientInfo;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// User agent and client IP of the current request.
///
/// The IP is the first `X-Forwarded-For` entry when present, otherwise the
/// peer address from `ConnectInfo`, otherwise empty.
#[derive(Debug, Clone)]
pub struct RequestClient(pub ClientInfo);

impl<S: Send + Sync> FromRequestParts<S> for RequestClient {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(RequestClient(client_info(&parts.headers, peer)))
    }
}

fn client_info(headers: &HeaderMap, peer: Option<String>) -> ClientInfo {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    ClientInfo {
        user_agent,
        client_ip: forwarded.or(peer).unwrap_or_default(),
    }
}
