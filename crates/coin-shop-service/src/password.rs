//! Password hashing.
//!
//! Argon2id with configurable cost. Hashing and verification are CPU-bound,
//! so both run on the blocking thread pool to keep request workers free.
//! Verification reads the cost parameters from the stored PHC string, so
//! changing the configured cost does not invalidate existing hashes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Password hashing errors.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed or the stored hash is malformed.
    #[error("password hash error: {0}")]
    Hash(password_hash::Error),

    /// The blocking task panicked or was cancelled.
    #[error("password task failed: {0}")]
    Task(String),
}

/// Argon2id cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the given cost.
    ///
    /// An out-of-range cost falls back to the argon2 defaults.
    #[must_use]
    pub fn new(cost: HashCost) -> Self {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, ?cost, "Invalid argon2 cost, using defaults");
                Params::default()
            });

        Self { params }
    }

    /// Hash a password into a PHC string.
    pub async fn hash(&self, password: String) -> Result<String, PasswordError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || hash_blocking(&params, &password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Check a password against a stored PHC string.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashCost::default())
    }
}

fn hash_blocking(params: &Params, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;

    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordError::Hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e)),
    }
}
