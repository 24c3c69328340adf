//! gRPC binding of the token service.

use crate::error::UserServiceError;
use crate::keys::PublicKeyMaterial;
use crate::proto::user_server::User;
use crate::proto::{UserInfo, UserPublicKey, UserToken};
use crate::service::TokenService;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};
use uuid::Uuid;

/// `user.User` service implementation.
#[derive(Clone)]
pub struct UserGrpcService {
    service: Arc<TokenService>,
}

impl UserGrpcService {
    /// Wraps a token service.
    #[must_use]
    pub const fn new(service: Arc<TokenService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl User for UserGrpcService {
    #[tracing::instrument(skip(self, request))]
    async fn login(&self, request: Request<UserInfo>) -> Result<Response<UserToken>, Status> {
        let req = request.into_inner();

        let issued = self
            .service
            .login(&req.username, &req.password)
            .map_err(|e| into_status(&e))?;

        Ok(Response::new(UserToken {
            token: issued.into_string(),
        }))
    }

    #[tracing::instrument(skip(self, _request))]
    async fn get_user_public_key(
        &self,
        _request: Request<()>,
    ) -> Result<Response<UserPublicKey>, Status> {
        let material = self.service.get_public_key().map_err(|e| into_status(&e))?;

        info!(key_id = %material.key_id, "Served public key");
        Ok(Response::new(material.into()))
    }
}

impl From<PublicKeyMaterial> for UserPublicKey {
    fn from(material: PublicKeyMaterial) -> Self {
        Self {
            modulus: material.modulus,
            exponent: material.exponent,
            key_id: material.key_id,
        }
    }
}

impl From<UserPublicKey> for PublicKeyMaterial {
    fn from(key: UserPublicKey) -> Self {
        Self {
            modulus: key.modulus,
            exponent: key.exponent,
            key_id: key.key_id,
        }
    }
}

/// Sanitized status carrying a fresh correlation id that also goes to the log.
fn into_status(err: &UserServiceError) -> Status {
    let correlation_id = Uuid::new_v4();
    match err {
        UserServiceError::Auth(_) => {
            warn!(%correlation_id, code = err.code().as_str(), "Request rejected");
        }
        _ => {
            error!(%correlation_id, code = err.code().as_str(), error = %err, "Request failed");
        }
    }
    err.to_status(correlation_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use tonic::Code;

    #[test]
    fn test_public_key_conversion() {
        let material = PublicKeyMaterial {
            modulus: "3233".to_string(),
            exponent: 17,
            key_id: "kid".to_string(),
        };

        let wire = UserPublicKey::from(material.clone());
        assert_eq!(wire.modulus, "3233");
        assert_eq!(wire.exponent, 17);
        assert_eq!(PublicKeyMaterial::from(wire), material);
    }

    #[test]
    fn test_wire_field_numbers() {
        use prost::Message;

        let info = UserInfo {
            username: "a".to_string(),
            password: "b".to_string(),
        };
        assert_eq!(info.encode_to_vec(), vec![0x0a, 1, b'a', 0x12, 1, b'b']);

        let key = UserPublicKey {
            modulus: "7".to_string(),
            exponent: 3,
            key_id: "k".to_string(),
        };
        assert_eq!(
            key.encode_to_vec(),
            vec![0x0a, 1, b'7', 0x10, 3, 0x1a, 1, b'k']
        );
    }

    #[test]
    fn test_auth_status_sanitized() {
        let status = into_status(&UserServiceError::Auth(AuthError::PasswordMismatch));

        assert_eq!(status.code(), Code::Unauthenticated);
        assert!(status.message().starts_with("invalid credentials"));
        assert!(status.message().contains("correlation_id"));
    }

    #[test]
    fn test_signing_status_hides_detail() {
        let status = into_status(&UserServiceError::Signing("rsa blew up".to_string()));

        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("rsa blew up"));
    }

    #[test]
    fn test_uninitialized_status() {
        let status = into_status(&UserServiceError::KeyNotInitialized);
        assert_eq!(status.code(), Code::FailedPrecondition);
        assert!(status.message().starts_with("key not initialized"));
    }
}
