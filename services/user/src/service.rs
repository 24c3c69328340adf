//! Token service: credential check, claim construction and signing.
//!
//! Stateless across calls. Nothing about an issued token is remembered,
//! so concurrent calls need no coordination.

use crate::config::Config;
use crate::error::{AuthError, UserServiceError};
use crate::jwt::{IssuedToken, TokenClaims};
use crate::keys::{PublicKeyMaterial, TokenSigner};
use crate::metrics::{self, LoginOutcome, SIGNING_DURATION};
use crate::principal::{password_matches, PrincipalStore};
use secrecy::SecretString;
use std::num::NonZeroU64;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL: NonZeroU64 = match NonZeroU64::new(60) {
    Some(ttl) => ttl,
    None => unreachable!(),
};

/// Issuance parameters fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceSettings {
    /// Lifetime of every issued token
    pub ttl_seconds: NonZeroU64,
    /// `iss` claim, if any
    pub issuer: Option<String>,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TOKEN_TTL,
            issuer: None,
        }
    }
}

impl From<&Config> for IssuanceSettings {
    fn from(config: &Config) -> Self {
        Self {
            ttl_seconds: config.token_ttl_seconds,
            issuer: Some(config.jwt_issuer.clone()),
        }
    }
}

/// Mediates between requests, the principal store and the signer.
pub struct TokenService {
    settings: IssuanceSettings,
    principals: Arc<dyn PrincipalStore>,
    signer: Arc<dyn TokenSigner>,
}

impl TokenService {
    /// Creates the service from its settings and capabilities.
    pub fn new(
        settings: IssuanceSettings,
        principals: Arc<dyn PrincipalStore>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            settings,
            principals,
            signer,
        }
    }

    /// Issuance settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &IssuanceSettings {
        &self.settings
    }

    /// Exchanges a username/password pair for a signed token.
    ///
    /// # Errors
    ///
    /// [`UserServiceError::Auth`] if the username is unknown or the password
    /// differs (callers see the same message either way), or the signer's
    /// error unchanged if signing fails.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, UserServiceError> {
        if let Err(err) = self.check_credentials(username, password) {
            metrics::record_login(LoginOutcome::Rejected);
            debug!(reason = err.reason(), "Credential check failed");
            warn!(username = %username, "Login rejected");
            return Err(err.into());
        }

        let mut claims = TokenClaims::new(username, self.settings.ttl_seconds);
        if let Some(issuer) = &self.settings.issuer {
            claims = claims.with_issuer(issuer.clone());
        }

        let timer = SIGNING_DURATION.start_timer();
        let signed = self.signer.sign(&claims);
        timer.observe_duration();

        let token = signed.inspect_err(|err| {
            metrics::record_login(LoginOutcome::Failed);
            warn!(username = %username, error = %err, "Token signing failed");
        })?;

        metrics::record_login(LoginOutcome::Issued);
        info!(
            subject = %claims.subject(),
            jti = %claims.token_id(),
            expires_at = claims.expires_at(),
            "Issued token"
        );

        Ok(IssuedToken::new(token, claims.expires_at()))
    }

    /// Returns the public key that verifies issued tokens.
    ///
    /// # Errors
    ///
    /// [`UserServiceError::KeyNotInitialized`] if the signer has no key.
    pub fn get_public_key(&self) -> Result<PublicKeyMaterial, UserServiceError> {
        metrics::record_public_key_request();
        self.signer.export_public()
    }

    fn check_credentials(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let recorded = self.principals.lookup(username);
        let known = recorded.is_some();

        // Unknown usernames still pay for a comparison.
        let recorded = recorded.unwrap_or_else(|| SecretString::from(String::new()));
        let matches = password_matches(&recorded, password);

        match (known, matches) {
            (false, _) => Err(AuthError::UnknownPrincipal),
            (true, false) => Err(AuthError::PasswordMismatch),
            (true, true) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCustodian, SigningKeypair};
    use crate::principal::{Principal, StaticPrincipalStore};
    use crate::verifier::TokenVerifier;

    const PRIVATE_PEM: &[u8] = include_bytes!("../tests/fixtures/private.pem");

    struct FailingSigner;

    impl TokenSigner for FailingSigner {
        fn sign(&self, _claims: &TokenClaims) -> Result<String, UserServiceError> {
            Err(UserServiceError::Signing("hardware fault".to_string()))
        }

        fn export_public(&self) -> Result<PublicKeyMaterial, UserServiceError> {
            Err(UserServiceError::KeyNotInitialized)
        }
    }

    fn principals() -> Arc<dyn PrincipalStore> {
        Arc::new(StaticPrincipalStore::from_principals([
            Principal::new("admin", "admin1234"),
            Principal::new("dezkoat", "dezkoat1234"),
        ]))
    }

    fn service() -> TokenService {
        let custodian = KeyCustodian::with_keypair(SigningKeypair::from_pem(PRIVATE_PEM).unwrap());
        TokenService::new(IssuanceSettings::default(), principals(), Arc::new(custodian))
    }

    #[test]
    fn test_default_settings() {
        let settings = IssuanceSettings::default();
        assert_eq!(settings.ttl_seconds.get(), 60);
        assert!(settings.issuer.is_none());
    }

    #[test]
    fn test_login_success() {
        let service = service();
        let token = service.login("admin", "admin1234").unwrap();

        let verifier = TokenVerifier::from_public_key(&service.get_public_key().unwrap()).unwrap();
        let claims = verifier.verify(token.as_str()).unwrap();

        assert_eq!(claims.subject(), "admin");
        assert_eq!(claims.expires_at(), token.expires_at());
        assert_eq!(claims.expires_at() - claims.issued_at_timestamp(), 60);
    }

    #[test]
    fn test_unknown_user() {
        let err = service().login("nobody", "x").unwrap_err();
        assert!(matches!(err, UserServiceError::Auth(AuthError::UnknownPrincipal)));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_unknown_user_with_placeholder_password() {
        let service = service();

        for password in ["", "admin1234"] {
            let err = service.login("nobody", password).unwrap_err();
            assert!(matches!(err, UserServiceError::Auth(AuthError::UnknownPrincipal)));
        }
    }

    #[test]
    fn test_wrong_password() {
        let err = service().login("admin", "dezkoat1234").unwrap_err();
        assert!(matches!(err, UserServiceError::Auth(AuthError::PasswordMismatch)));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_issuer_applied() {
        let custodian = KeyCustodian::with_keypair(SigningKeypair::from_pem(PRIVATE_PEM).unwrap());
        let settings = IssuanceSettings {
            ttl_seconds: NonZeroU64::new(300).unwrap(),
            issuer: Some("user-service".to_string()),
        };
        let service = TokenService::new(settings, principals(), Arc::new(custodian));

        let token = service.login("dezkoat", "dezkoat1234").unwrap();
        let verifier = TokenVerifier::from_public_key(&service.get_public_key().unwrap())
            .unwrap()
            .with_issuer("user-service");
        let claims = verifier.verify(token.as_str()).unwrap();

        assert_eq!(claims.issuer(), Some("user-service"));
        assert_eq!(claims.expires_at() - claims.issued_at_timestamp(), 300);
    }

    #[test]
    fn test_signing_error_propagates() {
        let service = TokenService::new(
            IssuanceSettings::default(),
            principals(),
            Arc::new(FailingSigner),
        );

        let err = service.login("admin", "admin1234").unwrap_err();
        assert!(matches!(err, UserServiceError::Signing(ref msg) if msg == "hardware fault"));
    }

    #[test]
    fn test_uninitialized_custodian() {
        let service = TokenService::new(
            IssuanceSettings::default(),
            principals(),
            Arc::new(KeyCustodian::new()),
        );

        assert!(matches!(
            service.get_public_key(),
            Err(UserServiceError::KeyNotInitialized)
        ));
        assert!(matches!(
            service.login("admin", "admin1234"),
            Err(UserServiceError::KeyNotInitialized)
        ));
    }

    #[test]
    fn test_public_key_idempotent() {
        let service = service();
        let before = service.get_public_key().unwrap();

        for _ in 0..3 {
            service.login("admin", "admin1234").unwrap();
        }

        assert_eq!(service.get_public_key().unwrap(), before);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let service = service();
        let a = service.login("admin", "admin1234").unwrap();
        let b = service.login("admin", "admin1234").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }
}
