//! Key custodian: holds the process signing key.
//!
//! The custodian moves from `Uninitialized` to `Ready` exactly once and
//! never back. After that the keypair is read-only, so signing and export
//! need no locking.

use crate::error::UserServiceError;
use crate::jwt::TokenClaims;
use crate::keys::keypair::{PublicKeyMaterial, SigningKeypair};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// Signing capability the token service depends on.
pub trait TokenSigner: Send + Sync {
    /// Sign the claims into a compact token string.
    ///
    /// # Errors
    ///
    /// [`UserServiceError::KeyNotInitialized`] before a key is loaded,
    /// [`UserServiceError::Signing`] if signing fails.
    fn sign(&self, claims: &TokenClaims) -> Result<String, UserServiceError>;

    /// Public key material that verifies tokens from [`TokenSigner::sign`].
    ///
    /// # Errors
    ///
    /// [`UserServiceError::KeyNotInitialized`] before a key is loaded.
    fn export_public(&self) -> Result<PublicKeyMaterial, UserServiceError>;
}

/// Lifecycle state of a [`KeyCustodian`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodianState {
    /// No key yet; only loading is valid.
    Uninitialized,
    /// Key loaded; signing and export are valid.
    Ready,
}

/// Owns the single signing keypair of the process.
#[derive(Debug, Default)]
pub struct KeyCustodian {
    keypair: OnceLock<SigningKeypair>,
}

impl KeyCustodian {
    /// Creates a custodian with no key.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keypair: OnceLock::new(),
        }
    }

    /// Loads the keypair from a PEM file and returns a ready custodian.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::KeyLoad`] if the file cannot be loaded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, UserServiceError> {
        let custodian = Self::new();
        custodian.initialize(path)?;
        Ok(custodian)
    }

    /// Wraps an already parsed keypair.
    #[must_use]
    pub fn with_keypair(keypair: SigningKeypair) -> Self {
        let keypair_slot = OnceLock::new();
        let _ = keypair_slot.set(keypair);
        Self {
            keypair: keypair_slot,
        }
    }

    /// Loads the keypair from a PEM file, moving to `Ready`.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::KeyLoad`] if the file cannot be loaded or
    /// a key is already installed.
    pub fn initialize(&self, path: impl AsRef<Path>) -> Result<(), UserServiceError> {
        let path = path.as_ref();
        let keypair = SigningKeypair::from_pem_file(path)?;
        self.install(keypair).map_err(|_| {
            UserServiceError::key_load(path.display().to_string(), "signing key already loaded")
        })?;

        info!(
            path = %path.display(),
            key_id = %self.key_id().unwrap_or_default(),
            "Signing key loaded"
        );
        Ok(())
    }

    /// Installs a parsed keypair, moving to `Ready`.
    ///
    /// # Errors
    ///
    /// Hands the keypair back if one is already installed.
    pub fn install(&self, keypair: SigningKeypair) -> Result<(), SigningKeypair> {
        self.keypair.set(keypair)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CustodianState {
        if self.keypair.get().is_some() {
            CustodianState::Ready
        } else {
            CustodianState::Uninitialized
        }
    }

    /// Key id of the loaded key, if any.
    #[must_use]
    pub fn key_id(&self) -> Option<String> {
        self.keypair.get().map(|k| k.key_id().to_string())
    }

    fn ready(&self) -> Result<&SigningKeypair, UserServiceError> {
        self.keypair.get().ok_or(UserServiceError::KeyNotInitialized)
    }
}

impl TokenSigner for KeyCustodian {
    fn sign(&self, claims: &TokenClaims) -> Result<String, UserServiceError> {
        self.ready()?.sign(claims)
    }

    fn export_public(&self) -> Result<PublicKeyMaterial, UserServiceError> {
        Ok(self.ready()?.public_key().clone())
    }
}
