//! Access token claims and the issued token wrapper.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Claims embedded in an issued access token.
///
/// Fields are private so a claim set cannot change between construction
/// and signing. `exp` is always strictly after `iat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    sub: String,
    exp: i64,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    jti: String,
}

impl TokenClaims {
    /// Claims for `subject`, issued now and valid for `ttl_seconds`.
    pub fn new(subject: impl Into<String>, ttl_seconds: NonZeroU64) -> Self {
        Self::issued_at(subject, Utc::now().timestamp(), ttl_seconds)
    }

    /// Claims for `subject` issued at the given Unix timestamp.
    pub fn issued_at(subject: impl Into<String>, issued_at: i64, ttl_seconds: NonZeroU64) -> Self {
        let ttl = i64::try_from(ttl_seconds.get()).unwrap_or(i64::MAX);
        Self {
            sub: subject.into(),
            exp: issued_at.saturating_add(ttl),
            iat: issued_at,
            iss: None,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Sets the `iss` claim.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Authenticated username.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Expiry as a Unix timestamp in seconds.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Issuance as a Unix timestamp in seconds.
    #[must_use]
    pub const fn issued_at_timestamp(&self) -> i64 {
        self.iat
    }

    /// Issuer, if set.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// Unique token id.
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.jti
    }

    /// Whether the token is expired at `timestamp`, i.e. past `exp`.
    #[must_use]
    pub const fn is_expired_at(&self, timestamp: i64) -> bool {
        timestamp > self.exp
    }
}

/// A signed token handed back from a successful login.
///
/// Not stored anywhere server side.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    token: String,
    expires_at: i64,
}

impl IssuedToken {
    /// Wraps a signed token string.
    #[must_use]
    pub const fn new(token: String, expires_at: i64) -> Self {
        Self { token, expires_at }
    }

    /// The compact token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Expiry as a Unix timestamp in seconds.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Consumes the wrapper, returning the token string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
