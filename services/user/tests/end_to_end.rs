//! Full round trip over TCP with the generated client.

mod common;

use common::token_service;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::Code;
use user_service::proto::user_client::UserClient;
use user_service::proto::UserInfo;
use user_service::{server, IssuanceSettings, PublicKeyMaterial, TokenVerifier};

#[tokio::test]
async fn test_login_and_verify_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = Arc::new(token_service(IssuanceSettings::default()));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(server::serve_on(
        listener,
        service,
        async {
            let _ = stop_rx.await;
        },
        Duration::from_secs(1),
    ));

    let mut client = UserClient::connect(format!("http://{addr}")).await.unwrap();

    let public = client
        .get_user_public_key(())
        .await
        .unwrap()
        .into_inner();
    let token = client
        .login(UserInfo {
            username: "admin".to_string(),
            password: "admin1234".to_string(),
        })
        .await
        .unwrap()
        .into_inner()
        .token;

    let verifier = TokenVerifier::from_public_key(&PublicKeyMaterial::from(public)).unwrap();
    assert_eq!(verifier.verify(&token).unwrap().subject(), "admin");

    let status = client
        .login(UserInfo {
            username: "nobody".to_string(),
            password: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert!(status.message().contains("correlation_id"));

    drop(client);
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
