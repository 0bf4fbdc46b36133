//! Password hashing and verification using Argon2id.
//!
//! Hashing uses OWASP-recommended parameters (memory: 19 MiB,
//! iterations: 2, parallelism: 1) with a random salt per hash. An
//! optional pepper (server-side secret) is prepended to the password
//! on both paths.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use warden_core::error::WardenResult;
use warden_core::validation;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Hashes and verifies passwords, and enforces the signup policy.
///
/// Plaintext passwords never leave this type and are never logged.
#[derive(Clone)]
pub struct CredentialStore {
    pepper: Option<String>,
    min_password_length: usize,
}

impl CredentialStore {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            pepper: config.pepper.clone(),
            min_password_length: config.min_password_length,
        }
    }

    /// Reject passwords outside the configured length bounds.
    pub fn check_policy(&self, password: &str) -> WardenResult<()> {
        validation::validate_password(password, self.min_password_length)
    }

    /// Hash `password` into a PHC-format Argon2id string.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
        let params = argon2::Params::new(19456, 2, 1, None)
            .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let input = self.peppered(password);
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
        let hash = argon2
            .hash_password(input.as_bytes(), &salt)
            .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verify `password` against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch and `Err(AuthError::Crypto)` only
    /// if the stored hash is malformed.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let parsed_hash = argon2::PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

        let input = self.peppered(password);
        match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_string(),
        }
    }
}
