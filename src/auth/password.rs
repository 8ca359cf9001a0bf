/// Password Hashing and Verification
///
/// bcrypt with a fresh random salt per hash. The cost is configurable and is
/// meant to be expensive, so callers on an async runtime should run these on a
/// blocking pool.

use bcrypt::{hash, verify};

use crate::configuration::HashingSettings;
use crate::error::{AppError, ValidationError};

/// bcrypt only reads this many bytes of input; anything longer is refused
/// instead of being silently cut off.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_settings(settings: &HashingSettings) -> Self {
        Self::new(settings.cost)
    }

    /// Hash a password
    ///
    /// # Errors
    /// - Validation error if the password is longer than 72 bytes
    /// - Internal error if bcrypt rejects the cost
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ValidationError::TooLong("password", MAX_PASSWORD_BYTES).into());
        }

        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check `password` against a stored hash.
    ///
    /// A malformed stored hash never matches, and neither does a password
    /// too long to have been hashed.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        match verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!("Password verification failed: {}", e);
                false
            }
        }
    }
}
