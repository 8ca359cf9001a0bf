/// JWT Token Issuance and Verification
///
/// Access and refresh tokens are both HS256 JWTs over [`Claims`], but each
/// class is signed with its own secret. A token of one class never verifies
/// as the other.

use std::fmt;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::AppError;

/// Why a token failed verification.
///
/// Only the issuer distinguishes these; session-level callers fold both into
/// a single invalid-token condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "Invalid token"),
            TokenError::Expired => write!(f, "Token has expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signing and verification keys for one token class
#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Mints and verifies access and refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    issuer: String,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        // Expiry is exact: a token is dead the second after `exp`
        validation.leeway = 0;

        Self {
            access: KeyPair::from_secret(&config.access_secret),
            refresh: KeyPair::from_secret(&config.refresh_secret),
            issuer: config.issuer.clone(),
            validation,
        }
    }

    /// Mint an access token for `email` valid for `ttl`
    pub fn issue_access(&self, email: &str, ttl: Duration) -> Result<String, AppError> {
        self.issue(&self.access, email, ttl)
    }

    /// Mint a refresh token for `email` valid for `ttl`
    pub fn issue_refresh(&self, email: &str, ttl: Duration) -> Result<String, AppError> {
        self.issue(&self.refresh, email, ttl)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.access, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.refresh, token)
    }

    fn issue(&self, keys: &KeyPair, email: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims::new(email, ttl, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn verify(&self, keys: &KeyPair, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    tracing::debug!("JWT validation error: {}", e);
                    TokenError::Invalid
                }
            })
    }
}
