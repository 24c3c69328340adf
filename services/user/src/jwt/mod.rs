//! Token claims and issued tokens.

pub mod claims;

pub use claims::{IssuedToken, TokenClaims};
