//! Process wiring: key loading, service construction and the gRPC server loop.

use crate::config::Config;
use crate::error::UserServiceError;
use crate::grpc::UserGrpcService;
use crate::keys::KeyCustodian;
use crate::principal::{Principal, StaticPrincipalStore};
use crate::proto::user_server::UserServer;
use crate::service::{IssuanceSettings, TokenService};
use crate::shutdown;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{info, warn};

/// Runs the service until a shutdown signal arrives.
///
/// The signing key is loaded before the listener is bound, so a bad key
/// never leaves a server accepting calls it cannot answer.
///
/// # Errors
///
/// [`UserServiceError::KeyLoad`] if the key cannot be loaded,
/// [`UserServiceError::Transport`] if binding or serving fails.
pub async fn run(mut config: Config) -> Result<(), UserServiceError> {
    let addr = config.socket_addr()?;
    let principals = std::mem::take(&mut config.principals);
    let service = Arc::new(build_service(&config, principals)?);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| UserServiceError::Transport(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "User service listening");

    serve_on(
        listener,
        service,
        shutdown::wait_for_signal(),
        config.shutdown_timeout,
    )
    .await?;

    info!("User service stopped");
    Ok(())
}

/// Loads the signing key and assembles a token service.
///
/// # Errors
///
/// [`UserServiceError::KeyLoad`] if the key at `private_key_path` cannot be
/// loaded.
pub fn build_service(
    config: &Config,
    principals: Vec<Principal>,
) -> Result<TokenService, UserServiceError> {
    let custodian = KeyCustodian::load(&config.private_key_path)?;
    let store = StaticPrincipalStore::from_principals(principals);
    let settings = IssuanceSettings::from(config);

    info!(
        principals = store.len(),
        ttl_seconds = settings.ttl_seconds.get(),
        issuer = settings.issuer.as_deref().unwrap_or_default(),
        "Token service ready"
    );

    Ok(TokenService::new(settings, Arc::new(store), Arc::new(custodian)))
}

/// Serves the gRPC surface on an already bound listener.
///
/// Once `shutdown` resolves, new connections are refused and in-flight
/// calls get `drain_timeout` to finish before the server is dropped.
///
/// # Errors
///
/// [`UserServiceError::Transport`] if the server fails.
pub async fn serve_on<F>(
    listener: TcpListener,
    service: Arc<TokenService>,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<(), UserServiceError>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = Server::builder()
        .add_service(UserServer::new(UserGrpcService::new(service)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
            let _ = stop_rx.await;
        });
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(UserServiceError::from);
        }
        () = shutdown => {
            info!("Shutdown signal received, draining connections");
        }
    }

    let _ = stop_tx.send(());

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(result) => result.map_err(UserServiceError::from),
        Err(_) => {
            warn!(
                timeout_seconds = drain_timeout.as_secs(),
                "Drain timeout reached, dropping remaining connections"
            );
            Ok(())
        }
    }
}
