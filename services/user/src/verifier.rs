//! Offline token verification.
//!
//! Everything needed to check a token is in the public key export: the
//! decimal modulus and the exponent rebuild the RSA key, and the token's
//! own `exp` claim bounds its lifetime. No call back to the service.

use crate::error::VerifyError;
use crate::jwt::TokenClaims;
use crate::keys::PublicKeyMaterial;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rsa::BigUint;

/// Verifies RS256 tokens against an exported public key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    key_id: String,
}

impl TokenVerifier {
    /// Builds a verifier from exported key material.
    ///
    /// Expiry is enforced with no leeway.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidKey`] if the modulus is not a positive
    /// decimal integer or the exponent is not positive.
    pub fn from_public_key(material: &PublicKeyMaterial) -> Result<Self, VerifyError> {
        let modulus: BigUint = material
            .modulus
            .parse()
            .map_err(|_| VerifyError::InvalidKey("modulus is not a decimal integer".to_string()))?;
        if modulus == BigUint::from(0u64) {
            return Err(VerifyError::InvalidKey("modulus is zero".to_string()));
        }

        let exponent = u64::try_from(material.exponent)
            .ok()
            .filter(|e| *e > 0)
            .ok_or_else(|| VerifyError::InvalidKey("exponent must be positive".to_string()))?;

        let n = URL_SAFE_NO_PAD.encode(modulus.to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(BigUint::from(exponent).to_bytes_be());
        let key = DecodingKey::from_rsa_components(&n, &e)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key,
            validation,
            key_id: material.key_id.clone(),
        })
    }

    /// Also require `iss` to equal `issuer`.
    #[must_use]
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation
            .set_required_spec_claims(&["exp", "sub", "iss"]);
        self
    }

    /// Key id this verifier was built for.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Checks signature and expiry, returning the decoded claims.
    ///
    /// # Errors
    ///
    /// [`VerifyError::Expired`] once `exp` has passed,
    /// [`VerifyError::InvalidSignature`] for a foreign or tampered token,
    /// [`VerifyError::IssuerMismatch`] when an issuer is required and differs,
    /// [`VerifyError::Malformed`] for anything that does not decode.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}
