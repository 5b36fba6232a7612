//! Password hashing using Argon2id
//!
//! Hashes are self-describing PHC strings (`$argon2id$v=19$m=...`), so the
//! parameters used at sign-up travel with the hash and verification keeps
//! working after the configured cost changes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// Cost parameters for new password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 2)
    pub time_cost: u32,
    /// Parallelism degree (default: 1)
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    /// The cheapest parameters Argon2 accepts; for tests only
    pub fn minimal() -> Self {
        Self {
            memory_cost: Params::MIN_M_COST,
            time_cost: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> TrackerResult<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| TrackerError::Password(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str, params: &HashParams) -> TrackerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TrackerError::Password(format!("Hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
///
/// A malformed stored hash is an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> TrackerResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| TrackerError::Password(format!("Stored hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
