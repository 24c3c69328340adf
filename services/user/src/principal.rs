//! Principal store.
//!
//! The token service only needs one capability from a credential store:
//! look up the password recorded for a username. [`StaticPrincipalStore`]
//! is the in-memory implementation seeded once at startup.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;

/// A stored credential record.
#[derive(Debug)]
pub struct Principal {
    username: String,
    password: SecretString,
}

impl Principal {
    /// Creates a principal record.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Unique username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Recorded password.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Credential lookup capability.
pub trait PrincipalStore: Send + Sync {
    /// Password recorded for `username`, or `None` if no such principal.
    fn lookup(&self, username: &str) -> Option<SecretString>;
}

/// Read-only, in-memory principal store.
#[derive(Debug, Default)]
pub struct StaticPrincipalStore {
    principals: HashMap<String, SecretString>,
}

impl StaticPrincipalStore {
    /// Builds the store from a list of principals.
    ///
    /// A later record with the same username replaces an earlier one.
    #[must_use]
    pub fn from_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let principals = principals
            .into_iter()
            .map(|p| (p.username, p.password))
            .collect();
        Self { principals }
    }

    /// Number of principals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether the store holds no principals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl PrincipalStore for StaticPrincipalStore {
    fn lookup(&self, username: &str) -> Option<SecretString> {
        self.principals
            .get(username)
            .map(|password| SecretString::from(password.expose_secret().to_owned()))
    }
}

/// Compares a presented password with the recorded one in constant time.
///
/// Both sides are hashed first so the comparison does not depend on length.
#[must_use]
pub fn password_matches(recorded: &SecretString, presented: &str) -> bool {
    let recorded = Sha256::digest(recorded.expose_secret().as_bytes());
    let presented = Sha256::digest(presented.as_bytes());

    recorded.as_slice().ct_eq(presented.as_slice()).into()
}
