//! Password hashing using Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;
use warden_core::{WardenError, WardenResult};

/// Hashing and verification of account passwords.
pub trait PasswordHasherInterface: Send + Sync {
    /// Hashes a password with a fresh salt.
    fn hash(&self, password: &str) -> WardenResult<String>;

    /// Verifies a password against a stored hash.
    ///
    /// A wrong password is `Ok(false)`; a malformed hash is an error.
    fn verify(&self, password: &str, hash: &str) -> WardenResult<bool>;

    /// Checks if a stored hash was produced with another algorithm or cost.
    fn needs_rehash(&self, hash: &str) -> bool;

    /// Checks that `password` equals `confirmation` and hashes it.
    fn hash_confirmed(&self, password: &str, confirmation: &str) -> WardenResult<String> {
        if password != confirmation {
            return Err(WardenError::validation("Passwords do not match"));
        }
        self.hash(password)
    }
}

/// Argon2id password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the library default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a hasher with explicit parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Creates a hasher from a memory cost in MiB.
    ///
    /// Falls back to the defaults if the cost is out of range.
    #[must_use]
    pub fn with_cost(cost_mib: u32) -> Self {
        let params = Params::new(cost_mib.saturating_mul(1024), 3, 1, None).unwrap_or(Params::DEFAULT);
        Self::with_params(params)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> WardenResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| WardenError::Internal(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed");
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> WardenResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| WardenError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(WardenError::Internal(format!("Password verification error: {}", e))),
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        let current = self.argon2.params();
        Params::try_from(&parsed).map_or(true, |stored| {
            stored.m_cost() != current.m_cost()
                || stored.t_cost() != current.t_cost()
                || stored.p_cost() != current.p_cost()
        })
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
