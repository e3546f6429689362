/// Domain-level error returned by the authentication, session and ownership
/// layers. Every variant is an expected condition the caller can act on.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Password did not match the stored hash.
    #[error("password mismatch")]
    Mismatch,

    /// A verified token's subject does not match the persisted session.
    #[error("session subject does not match token subject")]
    SubjectMismatch,

    /// The presented refresh token is not the one stored for its session.
    #[error("session token mismatch")]
    TokenMismatch,

    #[error("token or session has expired")]
    Expired,

    #[error("session is blocked")]
    Blocked,

    /// Malformed, tampered or foreign-key token.
    #[error("token is invalid")]
    InvalidSignature,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for results carrying a [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Startup misconfiguration. No degraded mode exists for these, so the
/// binary terminates when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("symmetric key must be exactly {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("{name} must be strictly positive")]
    NonPositiveDuration { name: &'static str },
}
