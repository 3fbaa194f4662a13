// src/core/acl/secret.rs

//! Argon2 hashing and verification of identity secrets.

use crate::config::SecurityConfig;
use crate::core::NavGateError;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

/// Input hashed once to produce the decoy used when no identity matches a login.
const DECOY_SECRET: &str = "navgate-decoy-secret";

/// Hashes plaintext secrets into argon2id PHC strings and verifies them.
///
/// Verification uses the parameters embedded in the stored hash, so changing the cost
/// parameters only affects newly hashed secrets.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
    /// Hash of [`DECOY_SECRET`] under the same parameters, built up front.
    decoy: String,
}

impl SecretHasher {
    /// Creates a hasher with explicit cost parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, NavGateError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: String::new(),
        };
        hasher.decoy = hasher.hash(DECOY_SECRET)?;
        Ok(hasher)
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, NavGateError> {
        Self::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Hashes a plaintext secret with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, NavGateError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(secret.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext secret against a stored PHC string.
    /// A stored value that is not a valid PHC string never verifies.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// The decoy PHC string used by [`verify_decoy`](Self::verify_decoy).
    pub fn decoy_hash(&self) -> &str {
        &self.decoy
    }

    /// Burns one verification against a decoy hash, so a login miss on the username
    /// costs the same as a miss on the secret. The result carries no meaning for a login.
    pub fn verify_decoy(&self, secret: &str) -> bool {
        self.verify(secret, &self.decoy)
    }
}
