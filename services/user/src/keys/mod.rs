//! Signing key custody.
//!
//! One RSA keypair is loaded from a PEM file at startup and held for the
//! life of the process. The private half only ever signs; the public half
//! is exported so callers can verify tokens offline.

pub mod custodian;
pub mod keypair;
pub mod thumbprint;

pub use custodian::{CustodianState, KeyCustodian, TokenSigner};
pub use keypair::{PublicKeyMaterial, SigningKeypair};
pub use thumbprint::rsa_thumbprint;
