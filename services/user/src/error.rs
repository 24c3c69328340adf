//! Error types for the user service.
//!
//! Per-request failures are returned straight to the caller as a gRPC
//! status. Messages that leave the process are sanitized: credential
//! failures never say which field was wrong, and key or signing failures
//! never carry internal detail.

use thiserror::Error;
use tonic::{Code, Status};
use uuid::Uuid;

/// Top-level error for key custody, issuance and startup.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserServiceError {
    /// Private key file missing, unreadable or malformed. Fatal at startup.
    #[error("failed to load signing key from {origin}: {reason}")]
    KeyLoad {
        /// Where the key was read from
        origin: String,
        /// What went wrong
        reason: String,
    },

    /// A signing or export call reached the custodian before a key was loaded.
    #[error("signing key not initialized")]
    KeyNotInitialized,

    /// Credential check failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Producing the token signature failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// A token did not pass verification.
    #[error(transparent)]
    Verification(#[from] VerifyError),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// gRPC transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Credential failures.
///
/// Both variants render as the same message so callers cannot tell an
/// unknown username from a wrong password.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No principal with the presented username.
    #[error("invalid credentials")]
    UnknownPrincipal,

    /// Principal exists but the password differs.
    #[error("invalid credentials")]
    PasswordMismatch,
}

impl AuthError {
    /// Internal reason label, for logs and metrics only.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::UnknownPrincipal => "unknown_principal",
            Self::PasswordMismatch => "password_mismatch",
        }
    }
}

/// Token verification failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Signature does not match the public key.
    #[error("token signature invalid")]
    InvalidSignature,

    /// Token structure or claims could not be decoded.
    #[error("token malformed: {0}")]
    Malformed(String),

    /// Public key material could not be turned into a verification key.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// `iss` does not match the expected issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,
}

/// Stable error codes for logs and gRPC responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Signing key could not be loaded
    KeyLoadFailed,
    /// No signing key loaded yet
    KeyNotInitialized,
    /// Unknown username or wrong password
    InvalidCredentials,
    /// Signature production failed
    SigningFailed,
    /// Token past its `exp`
    TokenExpired,
    /// Bad signature or issuer
    TokenInvalid,
    /// Token does not decode
    TokenMalformed,
    /// Invalid configuration value
    ConfigInvalid,
    /// gRPC transport failure
    TransportFailed,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeyLoadFailed => "KEY_LOAD_FAILED",
            Self::KeyNotInitialized => "KEY_NOT_INITIALIZED",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::SigningFailed => "SIGNING_FAILED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::TransportFailed => "TRANSPORT_FAILED",
        }
    }

    /// Get the gRPC status code for this error
    #[must_use]
    pub const fn grpc_code(&self) -> Code {
        match self {
            Self::InvalidCredentials | Self::TokenExpired | Self::TokenInvalid => {
                Code::Unauthenticated
            }
            Self::TokenMalformed | Self::ConfigInvalid => Code::InvalidArgument,
            Self::KeyNotInitialized => Code::FailedPrecondition,
            Self::KeyLoadFailed | Self::SigningFailed => Code::Internal,
            Self::TransportFailed => Code::Unavailable,
        }
    }
}

impl UserServiceError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::KeyLoad { .. } => ErrorCode::KeyLoadFailed,
            Self::KeyNotInitialized => ErrorCode::KeyNotInitialized,
            Self::Auth(_) => ErrorCode::InvalidCredentials,
            Self::Signing(_) => ErrorCode::SigningFailed,
            Self::Verification(VerifyError::Expired) => ErrorCode::TokenExpired,
            Self::Verification(VerifyError::Malformed(_)) => ErrorCode::TokenMalformed,
            Self::Verification(_) => ErrorCode::TokenInvalid,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::Transport(_) => ErrorCode::TransportFailed,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only transport failures are; everything else fails the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Message safe to return to a remote caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Auth(_) => "invalid credentials".to_string(),
            Self::KeyNotInitialized => "key not initialized".to_string(),
            Self::KeyLoad { .. } | Self::Signing(_) => "failed to issue token".to_string(),
            Self::Verification(err) => err.to_string(),
            Self::Config(_) => "invalid request".to_string(),
            Self::Transport(_) => "service unavailable".to_string(),
        }
    }

    /// Convert to gRPC Status with correlation ID
    #[must_use]
    pub fn to_status(&self, correlation_id: Uuid) -> Status {
        let message = format!("{} [correlation_id: {}]", self.public_message(), correlation_id);
        Status::new(self.code().grpc_code(), message)
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a key load error.
    #[must_use]
    pub fn key_load(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyLoad {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidRsaKey(reason) => Self::InvalidKey(reason.clone()),
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::Malformed(format!("missing required claim: {claim}"))
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

impl From<tonic::transport::Error> for UserServiceError {
    fn from(err: tonic::transport::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
