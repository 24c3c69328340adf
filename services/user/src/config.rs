//! Centralized configuration for the user service.
//!
//! All configuration is loaded from environment variables (and a `.env`
//! file, if present) and validated at startup.

use crate::error::UserServiceError;
use crate::observability::{LogFormat, TracingConfig};
use crate::principal::Principal;
use crate::service::DEFAULT_TOKEN_TTL;
use std::collections::HashSet;
use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 50002;
const DEFAULT_KEY_PATH: &str = "./key/private.pem";
const DEFAULT_PRINCIPALS: &str = "admin:admin1234,dezkoat:dezkoat1234";

/// User service configuration.
#[derive(Debug)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Time allowed for in-flight calls after a shutdown signal
    pub shutdown_timeout: Duration,

    // Signing settings
    /// PEM-encoded RSA private key
    pub private_key_path: PathBuf,
    /// Lifetime of issued tokens
    pub token_ttl_seconds: NonZeroU64,
    /// `iss` claim of issued tokens
    pub jwt_issuer: String,

    // Principal store seed
    /// Principals loaded at startup
    pub principals: Vec<Principal>,

    // Logging
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, UserServiceError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UserServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let shutdown_timeout = Duration::from_secs(parse_var(&lookup, "SHUTDOWN_TIMEOUT", 10)?);

        let private_key_path =
            PathBuf::from(lookup("PRIVATE_KEY_PATH").unwrap_or_else(|| DEFAULT_KEY_PATH.to_string()));
        let token_ttl_seconds =
            NonZeroU64::new(parse_var(&lookup, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL.get())?)
                .ok_or_else(|| {
                    UserServiceError::config("Invalid TOKEN_TTL_SECONDS: must be greater than 0")
                })?;
        let jwt_issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "user-service".to_string());

        let principals = parse_principals(
            &lookup("PRINCIPALS").unwrap_or_else(|| DEFAULT_PRINCIPALS.to_string()),
        )?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = parse_var(&lookup, "LOG_FORMAT", LogFormat::Text)?;

        let config = Self {
            host,
            port,
            shutdown_timeout,
            private_key_path,
            token_ttl_seconds,
            jwt_issuer,
            principals,
            log_level,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), UserServiceError> {
        if self.port == 0 {
            return Err(UserServiceError::config("Invalid PORT: must be between 1 and 65535"));
        }
        if self.jwt_issuer.trim().is_empty() {
            return Err(UserServiceError::config("JWT_ISSUER must not be empty"));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address the gRPC server binds to.
    ///
    /// `HOST` may be an IP address or a resolvable name such as `localhost`.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` does not resolve.
    pub fn socket_addr(&self) -> Result<SocketAddr, UserServiceError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| UserServiceError::config(format!("Invalid HOST {}: {e}", self.host)))?
            .next()
            .ok_or_else(|| {
                UserServiceError::config(format!("Invalid HOST {}: no addresses", self.host))
            })
    }

    /// Tracing settings derived from this configuration.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::default()
            .with_service_name("user-service")
            .with_log_level(&self.log_level)
            .with_format(self.log_format)
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, UserServiceError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| UserServiceError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Parse `user:password` pairs separated by commas.
fn parse_principals(raw: &str) -> Result<Vec<Principal>, UserServiceError> {
    let mut seen = HashSet::new();
    let mut principals = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (username, password) = entry.split_once(':').ok_or_else(|| {
            UserServiceError::config("Invalid PRINCIPALS: entries must be user:password")
        })?;

        let username = username.trim();
        if username.is_empty() {
            return Err(UserServiceError::config("Invalid PRINCIPALS: empty username"));
        }
        if !seen.insert(username.to_string()) {
            return Err(UserServiceError::config(format!(
                "Invalid PRINCIPALS: duplicate username {username}"
            )));
        }

        principals.push(Principal::new(username, password));
    }

    Ok(principals)
}
