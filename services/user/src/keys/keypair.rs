//! RSA signing keypair loaded from PEM.

use crate::error::UserServiceError;
use crate::jwt::TokenClaims;
use crate::keys::thumbprint::rsa_thumbprint;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;

const PKCS1_LABEL: &str = "RSA PRIVATE KEY";
const PKCS8_LABEL: &str = "PRIVATE KEY";

/// Smallest modulus the RS256 signer accepts.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Public half of the signing key, safe to hand to anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyMaterial {
    /// RSA modulus as a decimal string
    pub modulus: String,
    /// RSA public exponent
    pub exponent: i64,
    /// RFC 7638 thumbprint, used as the token `kid`
    pub key_id: String,
}

/// An RS256 signing keypair.
///
/// The private exponent is only reachable through [`SigningKeypair::sign`].
/// The public material is computed once at load time, so every export
/// returns identical values.
pub struct SigningKeypair {
    encoding_key: EncodingKey,
    public: PublicKeyMaterial,
    modulus_bits: usize,
}

impl SigningKeypair {
    /// Reads and parses a PEM-encoded RSA private key file.
    ///
    /// PKCS#1 (`RSA PRIVATE KEY`) is the expected format; PKCS#8
    /// (`PRIVATE KEY`) is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::KeyLoad`] if the file cannot be read, the
    /// PEM envelope is malformed, or the enclosed key cannot be parsed.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, UserServiceError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let bytes = std::fs::read(path)
            .map_err(|e| UserServiceError::key_load(&origin, format!("unreadable: {e}")))?;

        Self::parse(&bytes).map_err(|reason| UserServiceError::key_load(origin, reason))
    }

    /// Parses a PEM-encoded RSA private key held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::KeyLoad`] if the PEM or key structure is malformed.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, UserServiceError> {
        Self::parse(pem_bytes).map_err(|reason| UserServiceError::key_load("PEM input", reason))
    }

    fn parse(pem_bytes: &[u8]) -> Result<Self, String> {
        let block = pem::parse(pem_bytes).map_err(|e| format!("invalid PEM envelope: {e}"))?;

        let private_key = match block.tag() {
            PKCS1_LABEL => RsaPrivateKey::from_pkcs1_der(block.contents())
                .map_err(|e| format!("invalid PKCS#1 RSA private key: {e}"))?,
            PKCS8_LABEL => RsaPrivateKey::from_pkcs8_der(block.contents())
                .map_err(|e| format!("invalid PKCS#8 private key: {e}"))?,
            other => {
                return Err(format!(
                    "unsupported PEM block `{other}`, expected `{PKCS1_LABEL}`"
                ))
            }
        };

        Self::from_private_key(&private_key)
    }

    fn from_private_key(key: &RsaPrivateKey) -> Result<Self, String> {
        let modulus_bits = key.n().bits();
        if modulus_bits < MIN_MODULUS_BITS {
            return Err(format!(
                "RSA modulus is {modulus_bits} bits, at least {MIN_MODULUS_BITS} required"
            ));
        }

        let der = key
            .to_pkcs1_der()
            .map_err(|e| format!("failed to encode RSA private key: {e}"))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        let n = key.n().to_bytes_be();
        let e = key.e().to_bytes_be();
        let public = PublicKeyMaterial {
            modulus: key.n().to_string(),
            exponent: exponent_to_i64(&e)?,
            key_id: rsa_thumbprint(&n, &e),
        };

        let keypair = Self {
            encoding_key,
            public,
            modulus_bits,
        };

        // The signer has its own size and exponent limits, checked only when signing.
        keypair
            .sign(&TokenClaims::new("key-check", NonZeroU64::MIN))
            .map_err(|e| format!("key rejected by RS256 signer: {e}"))?;

        Ok(keypair)
    }

    /// Signs the claims as a compact RS256 JWT with this key's `kid` in the header.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Signing`] if encoding or signing fails.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, UserServiceError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.public.key_id.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| UserServiceError::Signing(e.to_string()))
    }

    /// Public modulus, exponent and key id.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKeyMaterial {
        &self.public
    }

    /// Key id carried in token headers.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.public.key_id
    }

    /// Modulus size in bits.
    #[must_use]
    pub const fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("key_id", &self.public.key_id)
            .field("modulus_bits", &self.modulus_bits)
            .finish_non_exhaustive()
    }
}

fn exponent_to_i64(be: &[u8]) -> Result<i64, String> {
    if be.len() > 8 {
        return Err("RSA public exponent exceeds 64 bits".to_string());
    }
    let value = be.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    i64::try_from(value).map_err(|_| "RSA public exponent exceeds 63 bits".to_string())
}
