//! User Service - Main Entry Point
//!
//! Issues RS256 access tokens for username/password logins over gRPC.

use anyhow::Context;
use tracing::{error, info};
use user_service::config::Config;
use user_service::observability::init_tracing;
use user_service::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(&config.tracing_config()).context("failed to initialize tracing")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        key_path = %config.private_key_path.display(),
        "Starting User Service"
    );

    if let Err(e) = server::run(config).await {
        error!(error = %e, code = e.code().as_str(), "User service terminated");
        return Err(e.into());
    }

    Ok(())
}
