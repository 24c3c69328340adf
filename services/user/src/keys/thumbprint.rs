//! JWK thumbprint calculation per RFC 7638.
//!
//! Used as the `kid` of the signing key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 thumbprint of an RSA public key.
///
/// `n` and `e` are the big-endian magnitudes of the modulus and exponent.
/// Per RFC 7638 the hash covers the required members in lexicographic
/// order with no whitespace.
#[must_use]
pub fn rsa_thumbprint(n: &[u8], e: &[u8]) -> String {
    let canonical = format!(
        r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
        URL_SAFE_NO_PAD.encode(e),
        URL_SAFE_NO_PAD.encode(n)
    );
    let hash = Sha256::digest(canonical.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
