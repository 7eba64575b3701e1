//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    Params(argon2::Error),
    #[error("failed to hash password: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    Malformed(password_hash::Error),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hashes secrets into PHC strings (`$argon2id$v=19$...`).
///
/// The cost parameters only apply to new hashes; verification reads the
/// parameters embedded in the stored hash.
#[derive(Clone, Debug)]
pub struct Hasher {
    params: Params,
}

impl Hasher {
    /// # Errors
    /// Returns an error if the cost parameters are out of Argon2 bounds.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(HashError::Params)?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `secret` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if Argon2 fails.
    pub fn hash(&self, secret: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(HashError::Hash)
    }

    /// Constant-time check of `secret` against a stored PHC string.
    ///
    /// # Errors
    /// Returns an error if `stored` is not a valid PHC string.
    pub fn verify(&self, secret: &str, stored: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(stored).map_err(HashError::Malformed)?;
        match self.argon2().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Malformed(e)),
        }
    }

    /// [`Hasher::hash`] on the blocking pool.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the task panics.
    pub async fn hash_blocking(&self, secret: &str) -> Result<String, HashError> {
        let hasher = self.clone();
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret)).await?
    }

    /// [`Hasher::verify`] on the blocking pool.
    ///
    /// # Errors
    /// Returns an error if `stored` is malformed or the task panics.
    pub async fn verify_blocking(&self, secret: &str, stored: &str) -> Result<bool, HashError> {
        let hasher = self.clone();
        let secret = secret.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &stored)).await?
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}
