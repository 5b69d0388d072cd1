//! Password hashing with bcrypt.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let hasher = PasswordHasher::new(12)?;
//! let hashed = hasher.hash("secret")?;
//! assert!(hasher.verify("secret", hashed.as_str()));
//! ```

use thiserror::Error;

/// Lowest bcrypt cost the service will hash with.
pub const MIN_BCRYPT_COST: u32 = 10;
/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error(
        "bcrypt cost {0} is outside the accepted range {min}..={max}",
        min = MIN_BCRYPT_COST,
        max = MAX_BCRYPT_COST
    )]
    InvalidCost(u32),
    #[error("password hashing failed: {0}")]
    HashingFailed(#[from] bcrypt::BcryptError),
    #[error("password hashing produced an empty hash")]
    EmptyHash,
}

/// A salted one-way hash of a password, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// bcrypt hasher with a cost fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher. Costs below [`MIN_BCRYPT_COST`] are refused so no
    /// weak hash can ever be produced.
    pub fn new(cost: u32) -> Result<Self, CryptoError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(CryptoError::InvalidCost(cost));
        }
        Ok(PasswordHasher { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password before storing it.
    pub fn hash(&self, password: &str) -> Result<HashedCredential, CryptoError> {
        let hashed = bcrypt::hash(password, self.cost)?;
        if hashed.is_empty() {
            return Err(CryptoError::EmptyHash);
        }
        Ok(HashedCredential(hashed))
    }

    /// Verify a password against a stored hash. A malformed hash never verifies.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }
}
