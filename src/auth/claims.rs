/// JWT Claims structure
///
/// The payload carried by both access and refresh tokens. Only the identity's
/// email is embedded; password material never leaves the credential store.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token ID, keeps tokens minted in the same second distinct
    pub jti: String,
}

impl Claims {
    /// Create claims for `email` expiring `ttl` from now
    pub fn new(email: &str, ttl: Duration, issuer: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            email: email.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}
