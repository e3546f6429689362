//! Session lifecycle: login, refresh, logout, revocation and blocking.
//!
//! A session is the persisted record of one refresh token. Its id is the
//! refresh token's payload id, so a verified refresh payload addresses its
//! session without any lookup by token string.
//!
//! ```text
//! ACTIVE ──block──▶ BLOCKED
//!   │                  │
//!   └──logout/revoke───┴──▶ DELETED
//! ```
//!
//! [`SessionManager`] is the only writer of session rows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use cnfs_core::error::{ConfigError, CoreError, CoreResult};
use cnfs_core::types::{DbId, Timestamp};
use cnfs_db::models::session::CreateSession;
use cnfs_db::models::user::User;
use cnfs_db::store::{SessionStore, UserStore};

use crate::auth::password::check_password;
use crate::auth::token::{Payload, TokenConfig, TokenError, TokenMaker};

/// Request metadata captured on the session row at login.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: String,
    pub client_ip: String,
}

/// An issued access token and its payload.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub payload: Payload,
}

impl AccessToken {
    pub fn expires_at(&self) -> Timestamp {
        self.payload.expired_at
    }
}

/// Everything a successful login produces.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: DbId,
    pub access: AccessToken,
    pub refresh: AccessToken,
    pub user: User,
}

/// Issues credentials and owns every session state transition.
#[derive(Clone)]
pub struct SessionManager {
    maker: Arc<dyn TokenMaker>,
    access_duration: Duration,
    refresh_duration: Duration,
}

impl SessionManager {
    pub fn new(
        maker: Arc<dyn TokenMaker>,
        access_duration: Duration,
        refresh_duration: Duration,
    ) -> Self {
        Self {
            maker,
            access_duration,
            refresh_duration,
        }
    }

    /// Build a manager with a JWT maker keyed from `config`.
    pub fn from_config(config: &TokenConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(config.maker()?),
            config.access_token_duration,
            config.refresh_token_duration,
        ))
    }

    /// The token maker, for request authentication.
    pub fn maker(&self) -> &dyn TokenMaker {
        self.maker.as_ref()
    }

    fn issue(&self, user_id: DbId, username: &str, duration: Duration) -> CoreResult<AccessToken> {
        let (token, payload) = self.maker.create_token(user_id, username, duration)?;
        Ok(AccessToken { token, payload })
    }

    /// Authenticate with username and password and open a new session.
    ///
    /// Every successful call creates exactly one session row; concurrent
    /// logins by the same user produce independent sessions.
    pub async fn login<S>(
        &self,
        store: &S,
        username: &str,
        password: &str,
        client: ClientInfo,
    ) -> CoreResult<LoginOutcome>
    where
        S: UserStore + SessionStore + ?Sized,
    {
        let user = store.get_user_by_username(username).await?;
        check_password(password, &user.password)?;

        let access = self.issue(user.id, &user.username, self.access_duration)?;
        let refresh = self.issue(user.id, &user.username, self.refresh_duration)?;

        let session = store
            .insert_session(&CreateSession {
                id: refresh.payload.id,
                user_id: user.id,
                username: user.username.clone(),
                refresh_token: refresh.token.clone(),
                user_agent: client.user_agent,
                client_ip: client.client_ip,
                expires_at: refresh.payload.expired_at,
            })
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "Session opened");

        Ok(LoginOutcome {
            session_id: session.id,
            access,
            refresh,
            user,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token and its session row are left unchanged.
    pub async fn refresh<S>(&self, store: &S, refresh_token: &str) -> CoreResult<AccessToken>
    where
        S: SessionStore + ?Sized,
    {
        self.refresh_at(store, refresh_token, Utc::now()).await
    }

    /// [`refresh`](Self::refresh) against an explicit clock.
    pub async fn refresh_at<S>(
        &self,
        store: &S,
        refresh_token: &str,
        now: Timestamp,
    ) -> CoreResult<AccessToken>
    where
        S: SessionStore + ?Sized,
    {
        let payload = self.maker.verify_token_at(refresh_token, now)?;
        let session = store.get_session(payload.id).await?;

        if session.is_blocked {
            tracing::warn!(session_id = %session.id, "Refresh rejected: session blocked");
            return Err(CoreError::Blocked);
        }
        if session.user_id != payload.user_id || session.username != payload.username {
            tracing::warn!(session_id = %session.id, "Refresh rejected: subject mismatch");
            return Err(CoreError::SubjectMismatch);
        }
        if session.refresh_token != refresh_token {
            tracing::warn!(session_id = %session.id, "Refresh rejected: token mismatch");
            return Err(CoreError::TokenMismatch);
        }
        if now > session.expires_at {
            tracing::warn!(session_id = %session.id, "Refresh rejected: session expired");
            return Err(CoreError::Expired);
        }

        self.issue(payload.user_id, &payload.username, self.access_duration)
    }

    /// Delete one session. A second call for the same id is `NotFound`.
    pub async fn logout<S>(&self, store: &S, session_id: DbId) -> CoreResult<()>
    where
        S: SessionStore + ?Sized,
    {
        store.delete_session(session_id).await?;
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }

    /// Log out the session a refresh token belongs to.
    ///
    /// Only the signature is checked, so an expired refresh token can still
    /// close its own session.
    pub async fn logout_token<S>(&self, store: &S, refresh_token: &str) -> CoreResult<()>
    where
        S: SessionStore + ?Sized,
    {
        let payload = match self.maker.verify_token(refresh_token) {
            Ok(payload) => payload,
            Err(TokenError::Expired) => self
                .maker
                .verify_token_at(refresh_token, Timestamp::MIN_UTC)?,
            Err(e) => return Err(e.into()),
        };
        self.logout(store, payload.id).await
    }

    /// Delete every session of `user_id`. `NotFound` when there were none.
    pub async fn revoke_all<S>(&self, store: &S, user_id: DbId) -> CoreResult<usize>
    where
        S: SessionStore + ?Sized,
    {
        let ids = store.delete_sessions_by_user(user_id).await?;
        tracing::info!(user_id = %user_id, count = ids.len(), "Sessions revoked");
        Ok(ids.len())
    }

    /// Administratively block a session so it can no longer refresh.
    pub async fn block<S>(&self, store: &S, session_id: DbId) -> CoreResult<()>
    where
        S: SessionStore + ?Sized,
    {
        store.block_session(session_id).await?;
        tracing::info!(session_id = %session_id, "Session blocked");
        Ok(())
    }

    /// Verify an access token and return its payload.
    pub fn validate(&self, access_token: &str) -> CoreResult<Payload> {
        Ok(self.maker.verify_token(access_token)?)
    }
}
