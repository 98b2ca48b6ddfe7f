//! Password hashing and token signing primitives.
//!
//! Both services are constructed once from configuration and shared
//! immutably across workers.

pub mod password;
pub mod token;

pub use password::CredentialHasher;
pub use token::{AccessClaims, TokenError, TokenSigner};
