use bcrypt::DEFAULT_COST;

use crate::error::AppError;

// bcrypt's supported work-factor range.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// One-way password hashing with a tunable work factor.
///
/// Produces salted, self-describing bcrypt hashes; verification is
/// constant-time inside bcrypt.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    /// A cost outside bcrypt's supported range is clamped to the default
    /// rather than rejected.
    pub fn new(cost: u32) -> Self {
        let cost = if (MIN_COST..=MAX_COST).contains(&cost) {
            cost
        } else {
            DEFAULT_COST
        };
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Returns false for a wrong password or a malformed stored hash;
    /// never panics.
    pub fn verify(&self, stored_hash: &str, plaintext: &str) -> bool {
        bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
    }
}
