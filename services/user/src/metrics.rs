//! Prometheus metrics for the user service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
};

/// Login attempts by outcome.
pub static LOGINS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "user_service_logins_total",
        "Total number of login attempts",
        &["outcome"]
    )
    .expect("Failed to register logins metric")
});

/// Public key export requests.
pub static PUBLIC_KEY_REQUESTS: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "user_service_public_key_requests_total",
        "Total number of public key requests"
    )
    .expect("Failed to register public_key_requests metric")
});

/// Time spent producing token signatures.
pub static SIGNING_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "user_service_signing_duration_seconds",
        "Token signing latency in seconds",
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1]
    )
    .expect("Failed to register signing_duration metric")
});

/// Outcome label for [`LOGINS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Token issued.
    Issued,
    /// Credentials rejected.
    Rejected,
    /// Credentials accepted but signing failed.
    Failed,
}

impl LoginOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Records a login attempt.
pub fn record_login(outcome: LoginOutcome) {
    LOGINS.with_label_values(&[outcome.as_str()]).inc();
}

/// Records a public key request.
pub fn record_public_key_request() {
    PUBLIC_KEY_REQUESTS.inc();
}
