//! Signed, time-bound credentials (access and refresh tokens).
//!
//! Both token kinds are HS256-signed JWTs carrying a [`Payload`]. The only
//! difference between them is the lifetime they are issued with; a refresh
//! token additionally has a persisted session keyed by its payload id.
//!
//! Verification is a pure function of the token string, the configured key
//! and the current time. It never consults storage, which is what lets a
//! session be revoked while its refresh token is still cryptographically
//! valid.

use std::fmt;

use chrono::{Duration, Utc};
use cnfs_core::error::{ConfigError, CoreError};
use cnfs_core::types::{DbId, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Required length of the symmetric signing key, in bytes.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token lifetime in minutes (24 hours).
const DEFAULT_REFRESH_EXPIRY_MINS: i64 = 24 * 60;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Unique id of this credential. For refresh tokens this is also the
    /// session id.
    pub id: DbId,
    pub user_id: DbId,
    /// Username at issuance time; not re-resolved on verification.
    pub username: String,
    pub issued_at: Timestamp,
    pub expired_at: Timestamp,
}

impl Payload {
    /// Build a payload with a fresh id, issued now.
    pub fn new(user_id: DbId, username: &str, duration: Duration) -> Result<Self, TokenError> {
        let issued_at = Utc::now();
        let expired_at = issued_at
            .checked_add_signed(duration)
            .ok_or(TokenError::LifetimeOutOfRange)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            issued_at,
            expired_at,
        })
    }

    /// A payload is valid while `now <= expired_at`.
    pub fn valid_at(&self, now: Timestamp) -> Result<(), TokenError> {
        if now > self.expired_at {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}

/// Failure to create or verify a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Garbled, tampered, or signed with another key or algorithm.
    #[error("token is invalid")]
    Invalid,

    /// Well-formed and authentic, but past its expiry.
    #[error("token has expired")]
    Expired,

    /// The requested lifetime puts the expiry outside the representable range.
    #[error("token lifetime is out of range")]
    LifetimeOutOfRange,

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => CoreError::InvalidSignature,
            TokenError::Expired => CoreError::Expired,
            TokenError::LifetimeOutOfRange => {
                CoreError::Internal("token lifetime is out of range".into())
            }
            TokenError::Signing(e) => CoreError::Internal(format!("token signing failed: {e}")),
        }
    }
}

/// Capability to issue and check credentials.
pub trait TokenMaker: Send + Sync {
    /// Issue a token for `user_id` valid for `duration`, returning the
    /// serialized token and its payload.
    fn create_token(
        &self,
        user_id: DbId,
        username: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError>;

    /// Verify `token` as of `now`.
    fn verify_token_at(&self, token: &str, now: Timestamp) -> Result<Payload, TokenError>;

    /// Verify `token` against the current time.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }
}

/// HS256 JWT implementation of [`TokenMaker`].
pub struct JwtMaker {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtMaker")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl JwtMaker {
    /// Build a maker from a symmetric key of exactly [`SYMMETRIC_KEY_LEN`] bytes.
    pub fn new(symmetric_key: &[u8]) -> Result<Self, ConfigError> {
        if symmetric_key.len() != SYMMETRIC_KEY_LEN {
            return Err(ConfigError::KeyLength {
                expected: SYMMETRIC_KEY_LEN,
                actual: symmetric_key.len(),
            });
        }

        // Expiry is checked against `Payload::expired_at` with full precision
        // and no leeway, so the library's own claim checks are switched off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(symmetric_key),
            decoding: DecodingKey::from_secret(symmetric_key),
            validation,
        })
    }
}

impl TokenMaker for JwtMaker {
    fn create_token(
        &self,
        user_id: DbId,
        username: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(user_id, username, duration)?;
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(TokenError::Signing)?;
        Ok((token, payload))
    }

    fn verify_token_at(&self, token: &str, now: Timestamp) -> Result<Payload, TokenError> {
        let payload = decode::<Payload>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;
        payload.valid_at(now)?;
        Ok(payload)
    }
}

/// Key and lifetimes for token issuance.
#[derive(Clone)]
pub struct TokenConfig {
    /// Symmetric signing key, exactly [`SYMMETRIC_KEY_LEN`] bytes.
    pub symmetric_key: String,
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("symmetric_key", &"<redacted>")
            .field("access_token_duration", &self.access_token_duration)
            .field("refresh_token_duration", &self.refresh_token_duration)
            .finish()
    }
}

impl TokenConfig {
    /// Build and validate a configuration. Lifetimes are in minutes.
    pub fn new(
        symmetric_key: impl Into<String>,
        access_expiry_mins: i64,
        refresh_expiry_mins: i64,
    ) -> Result<Self, ConfigError> {
        let symmetric_key = symmetric_key.into();
        if symmetric_key.len() != SYMMETRIC_KEY_LEN {
            return Err(ConfigError::KeyLength {
                expected: SYMMETRIC_KEY_LEN,
                actual: symmetric_key.len(),
            });
        }
        Ok(Self {
            symmetric_key,
            access_token_duration: lifetime("ACCESS_TOKEN_EXPIRY_MINS", access_expiry_mins)?,
            refresh_token_duration: lifetime("REFRESH_TOKEN_EXPIRY_MINS", refresh_expiry_mins)?,
        })
    }

    /// Load token configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `TOKEN_SYMMETRIC_KEY`       | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`  | no       | `15`    |
    /// | `REFRESH_TOKEN_EXPIRY_MINS` | no       | `1440`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let symmetric_key = std::env::var("TOKEN_SYMMETRIC_KEY").map_err(|_| {
            ConfigError::Missing {
                name: "TOKEN_SYMMETRIC_KEY",
            }
        })?;
        let access = crate::config::env_or("ACCESS_TOKEN_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?;
        let refresh =
            crate::config::env_or("REFRESH_TOKEN_EXPIRY_MINS", DEFAULT_REFRESH_EXPIRY_MINS)?;
        Self::new(symmetric_key, access, refresh)
    }

    /// Build the token maker for this key.
    pub fn maker(&self) -> Result<JwtMaker, ConfigError> {
        JwtMaker::new(self.symmetric_key.as_bytes())
    }
}

/// Turn a lifetime in minutes into a [`Duration`].
///
/// The lifetime must be positive and a token issued now with it must have a
/// representable expiry, so issuance can never overflow later.
fn lifetime(name: &'static str, minutes: i64) -> Result<Duration, ConfigError> {
    if minutes <= 0 {
        return Err(ConfigError::NonPositiveDuration { name });
    }
    let out_of_range = || ConfigError::Invalid {
        name,
        value: minutes.to_string(),
    };
    let duration = Duration::try_minutes(minutes).ok_or_else(out_of_range)?;
    Utc::now()
        .checked_add_signed(duration)
        .ok_or_else(out_of_range)?;
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn maker() -> JwtMaker {
        JwtMaker::new(KEY).expect("32-byte key is valid")
    }

    #[test]
    fn test_create_and_verify_round_trip() {
        let maker = maker();
        let user_id = Uuid::new_v4();

        let (token, issued) = maker
            .create_token(user_id, "alice", Duration::minutes(1))
            .expect("token creation should succeed");
        let payload = maker.verify_token(&token).expect("fresh token should verify");

        assert_eq!(payload.user_id, user_id);
        assert_eq!(payload.username, "alice");
        assert_eq!(payload, issued);
        assert!(payload.expired_at > payload.issued_at);
    }

    #[test]
    fn test_every_token_gets_a_fresh_id() {
        let maker = maker();
        let user_id = Uuid::new_v4();
        let (_, first) = maker
            .create_token(user_id, "alice", Duration::minutes(1))
            .unwrap();
        let (_, second) = maker
            .create_token(user_id, "alice", Duration::minutes(1))
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_expiry_boundary() {
        let maker = maker();
        let epsilon = Duration::milliseconds(1);
        for duration in [Duration::seconds(1), Duration::minutes(15), Duration::days(7)] {
            let (token, issued) = maker
                .create_token(Uuid::new_v4(), "bob", duration)
                .unwrap();
            assert_eq!(issued.expired_at - issued.issued_at, duration);

            assert!(maker
                .verify_token_at(&token, issued.issued_at + duration - epsilon)
                .is_ok());
            assert!(maker
                .verify_token_at(&token, issued.expired_at)
                .is_ok());
            assert_matches!(
                maker.verify_token_at(&token, issued.issued_at + duration + epsilon),
                Err(TokenError::Expired)
            );
        }
    }

    #[test]
    fn test_flipping_any_byte_invalidates() {
        let maker = maker();
        let (token, _) = maker
            .create_token(Uuid::new_v4(), "carol", Duration::minutes(5))
            .unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).expect("ascii stays ascii");
            assert_matches!(
                maker.verify_token(&tampered),
                Err(TokenError::Invalid),
                "byte {i} flipped must be rejected as invalid"
            );
        }
    }

    #[test]
    fn test_tampered_expired_token_is_invalid_not_expired() {
        let maker = maker();
        let (token, issued) = maker
            .create_token(Uuid::new_v4(), "dave", Duration::seconds(1))
            .unwrap();
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = String::from_utf8(bytes).unwrap();

        let later = issued.expired_at + Duration::hours(1);
        assert_matches!(
            maker.verify_token_at(&tampered, later),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_different_keys_fail() {
        let maker_a = maker();
        let maker_b = JwtMaker::new(b"fedcba9876543210fedcba9876543210").unwrap();
        let (token, _) = maker_a
            .create_token(Uuid::new_v4(), "erin", Duration::minutes(5))
            .unwrap();
        assert_matches!(maker_b.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let maker = maker();
        for garbage in ["", "not-a-token", "a.b.c", "..."] {
            assert_matches!(maker.verify_token(garbage), Err(TokenError::Invalid));
        }
    }

    #[test]
    fn test_wrong_key_length_is_a_config_error() {
        assert_matches!(
            JwtMaker::new(b"too-short"),
            Err(ConfigError::KeyLength {
                expected: 32,
                actual: 9
            })
        );
        assert_matches!(
            JwtMaker::new(&[0u8; 33]),
            Err(ConfigError::KeyLength { actual: 33, .. })
        );
    }

    #[test]
    fn test_token_config_rejects_non_positive_durations() {
        let key = std::str::from_utf8(KEY).unwrap();
        assert!(TokenConfig::new(key, 15, 1440).is_ok());
        assert_matches!(
            TokenConfig::new(key, 0, 1440),
            Err(ConfigError::NonPositiveDuration {
                name: "ACCESS_TOKEN_EXPIRY_MINS"
            })
        );
        assert_matches!(
            TokenConfig::new(key, 15, -1),
            Err(ConfigError::NonPositiveDuration {
                name: "REFRESH_TOKEN_EXPIRY_MINS"
            })
        );
        assert_matches!(
            TokenConfig::new("short", 15, 1440),
            Err(ConfigError::KeyLength { .. })
        );
    }

    #[test]
    fn test_token_config_rejects_unrepresentable_lifetimes() {
        let key = std::str::from_utf8(KEY).unwrap();
        for minutes in [10_000_000_000_000, i64::MAX] {
            assert_matches!(
                TokenConfig::new(key, 15, minutes),
                Err(ConfigError::Invalid {
                    name: "REFRESH_TOKEN_EXPIRY_MINS",
                    ..
                })
            );
            assert_matches!(
                TokenConfig::new(key, minutes, 1440),
                Err(ConfigError::Invalid {
                    name: "ACCESS_TOKEN_EXPIRY_MINS",
                    ..
                })
            );
        }
    }

    #[test]
    fn test_overflowing_duration_fails_to_issue() {
        assert_matches!(
            maker().create_token(Uuid::new_v4(), "frank", Duration::MAX),
            Err(TokenError::LifetimeOutOfRange)
        );
    }

    #[test]
    fn test_maker_debug_hides_keys() {
        let printed = format!("{:?}", maker());
        assert!(printed.starts_with("JwtMaker"));
        assert!(!printed.contains("0123456789abcdef"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = std::str::from_utf8(KEY).unwrap();
        let config = TokenConfig::new(key, 15, 1440).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains(key));
        assert!(printed.contains("<redacted>"));
    }
}
