//! User Service library.
//!
//! Verifies username/password credentials against a principal store and
//! issues short-lived RS256 access tokens. The RSA public key that verifies
//! those tokens is exported over the same gRPC surface, so any holder can
//! check a token offline with [`verifier::TokenVerifier`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod grpc;
pub mod jwt;
pub mod keys;
pub mod metrics;
pub mod observability;
pub mod principal;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod verifier;

#[allow(missing_docs, clippy::pedantic)]
pub mod proto;

// Re-exports for convenience
pub use config::Config;
pub use error::{AuthError, UserServiceError, VerifyError};
pub use keys::{KeyCustodian, PublicKeyMaterial, SigningKeypair, TokenSigner};
pub use principal::{Principal, PrincipalStore, StaticPrincipalStore};
pub use service::{IssuanceSettings, TokenService};
pub use verifier::TokenVerifier;
