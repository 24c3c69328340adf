//! Login and public key behaviour of the token service.

mod common;

use common::{token_service, PRIVATE_MODULUS};
use user_service::error::AuthError;
use user_service::{IssuanceSettings, TokenVerifier, UserServiceError};

#[test]
fn test_admin_login_scenario() {
    let service = token_service(IssuanceSettings::default());

    // Public key is available before any login.
    let before = service.get_public_key().unwrap();
    assert_eq!(before.modulus, PRIVATE_MODULUS.trim());
    assert_eq!(before.exponent, 65537);

    let token = service.login("admin", "admin1234").unwrap();
    let claims = TokenVerifier::from_public_key(&before)
        .unwrap()
        .verify(token.as_str())
        .unwrap();
    assert_eq!(claims.subject(), "admin");

    let err = service.login("nobody", "x").unwrap_err();
    assert_eq!(err.to_string(), "invalid credentials");

    for _ in 0..3 {
        service.login("dezkoat", "dezkoat1234").unwrap();
    }
    assert_eq!(service.get_public_key().unwrap(), before);
}

#[test]
fn test_wrong_password_rejected() {
    let service = token_service(IssuanceSettings::default());

    for password in ["", "admin", "admin12345", "ADMIN1234", "dezkoat1234"] {
        let err = service.login("admin", password).unwrap_err();
        assert!(matches!(
            err,
            UserServiceError::Auth(AuthError::PasswordMismatch)
        ));
    }
}

#[test]
fn test_rejections_indistinguishable() {
    let service = token_service(IssuanceSettings::default());

    let unknown = service.login("nobody", "admin1234").unwrap_err();
    let mismatch = service.login("admin", "wrong").unwrap_err();

    assert_eq!(unknown.to_string(), mismatch.to_string());
    assert_eq!(unknown.code(), mismatch.code());
    assert_eq!(unknown.public_message(), mismatch.public_message());
}

#[test]
fn test_expiry_is_issuance_plus_ttl() {
    let service = token_service(IssuanceSettings::default());
    let verifier = TokenVerifier::from_public_key(&service.get_public_key().unwrap()).unwrap();

    let token = service.login("admin", "admin1234").unwrap();
    let claims = verifier.verify(token.as_str()).unwrap();

    assert_eq!(claims.expires_at(), claims.issued_at_timestamp() + 60);
    assert!(claims.is_expired_at(claims.expires_at() + 1));
    assert!(!claims.is_expired_at(claims.expires_at()));
}

#[test]
fn test_concurrent_logins() {
    let service = std::sync::Arc::new(token_service(IssuanceSettings::default()));
    let verifier = TokenVerifier::from_public_key(&service.get_public_key().unwrap()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                let (user, password) = if i % 2 == 0 {
                    ("admin", "admin1234")
                } else {
                    ("dezkoat", "dezkoat1234")
                };
                (user, service.login(user, password).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (user, token) = handle.join().unwrap();
        assert_eq!(verifier.verify(token.as_str()).unwrap().subject(), user);
    }
}
