// Password hashing and verification (bcrypt)

use crate::core::errors::ServiceError;
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Default bcrypt cost; roughly 50-100ms per hash.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only reads this many bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Input for the stand-in hash checked when no account matches
const DUMMY_PASSWORD: &str = "certificate-registry-no-such-account";

/// Plaintext password, redacted in `Debug` and `Display`
#[derive(Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn new(password: &str) -> Self {
        Self(Secret::new(password.to_string()))
    }

    /// Expose the plaintext (hashing and verification only)
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Longer than bcrypt can distinguish
    pub fn is_too_long(&self) -> bool {
        self.0.expose_secret().len() > MAX_PASSWORD_BYTES
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(Secret::new(password))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("value", &"<REDACTED>")
            .finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<REDACTED>")
    }
}

/// Salted bcrypt hash as stored in the account table
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string loaded from storage
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash(<REDACTED>)")
    }
}

/// bcrypt hasher with a fixed cost factor
///
/// bcrypt is CPU-bound, so both operations run on tokio's blocking pool.
/// Clones share one lazily built dummy hash at the same cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy: Arc<OnceCell<PasswordHash>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy: Arc::new(OnceCell::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &Password) -> Result<PasswordHash, ServiceError> {
        let password = password.clone();
        let cost = self.cost;

        let hashed = tokio::task::spawn_blocking(move || {
            bcrypt::hash(password.expose_secret(), cost)
        })
        .await
        .map_err(|e| ServiceError::CryptoError(format!("Hashing task failed: {}", e)))?
        .map_err(|e| ServiceError::CryptoError(format!("Failed to hash password: {}", e)))?;

        Ok(PasswordHash(hashed))
    }

    /// Check a password against a stored hash
    ///
    /// A hash that bcrypt cannot parse counts as a mismatch, not a fault.
    /// So does a password past `MAX_PASSWORD_BYTES`, which bcrypt would
    /// otherwise truncate.
    pub async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, ServiceError> {
        if password.is_too_long() {
            return Ok(false);
        }
        let password = password.clone();
        let hash = hash.clone();

        tokio::task::spawn_blocking(move || {
            bcrypt::verify(password.expose_secret(), hash.as_str()).unwrap_or(false)
        })
        .await
        .map_err(|e| ServiceError::CryptoError(format!("Verification task failed: {}", e)))
    }

    /// Hash of a fixed throwaway password at this hasher's cost
    ///
    /// Built on first use; call once at startup to keep the first
    /// unknown-email login from paying for it.
    pub async fn dummy_hash(&self) -> Result<&PasswordHash, ServiceError> {
        self.dummy
            .get_or_try_init(|| async { self.hash(&Password::new(DUMMY_PASSWORD)).await })
            .await
    }

    /// True once `dummy_hash` has been built
    pub fn has_dummy_hash(&self) -> bool {
        self.dummy.initialized()
    }

    /// Spend one verification's worth of work and report a mismatch
    ///
    /// Used when there is no stored hash, so the caller's response time does
    /// not reveal that the account is missing.
    pub async fn verify_absent(&self, password: &Password) -> Result<bool, ServiceError> {
        let hash = self.dummy_hash().await?.clone();
        self.verify(password, &hash).await?;
        Ok(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
