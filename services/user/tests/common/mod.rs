//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use user_service::{
    IssuanceSettings, KeyCustodian, Principal, SigningKeypair, StaticPrincipalStore, TokenService,
};

pub const PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/private.pem");
pub const OTHER_PEM: &[u8] = include_bytes!("../fixtures/other_private.pem");
pub const PRIVATE_MODULUS: &str = include_str!("../fixtures/private.modulus");

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The two principals the service ships with.
pub fn default_principals() -> Vec<Principal> {
    vec![
        Principal::new("admin", "admin1234"),
        Principal::new("dezkoat", "dezkoat1234"),
    ]
}

pub fn custodian() -> KeyCustodian {
    KeyCustodian::with_keypair(SigningKeypair::from_pem(PRIVATE_PEM).unwrap())
}

pub fn token_service(settings: IssuanceSettings) -> TokenService {
    TokenService::new(
        settings,
        Arc::new(StaticPrincipalStore::from_principals(default_principals())),
        Arc::new(custodian()),
    )
}
