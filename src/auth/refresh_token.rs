/// Refresh Token Registry
///
/// The authoritative set of live refresh tokens. A refresh token is only
/// usable while it is in here, on top of verifying and being unexpired.
/// - Tokens are kept as SHA-256 digests, never in plaintext
/// - Entries leave only through `revoke`; expiry is checked by the verifier

use dashmap::DashSet;
use sha2::{Digest, Sha256};

#[derive(Debug, Default)]
pub struct RefreshTokenRegistry {
    live: DashSet<String>,
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl RefreshTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `token` as live
    pub fn issue(&self, token: &str) {
        self.live.insert(hash_token(token));
    }

    pub fn is_live(&self, token: &str) -> bool {
        self.live.contains(&hash_token(token))
    }

    /// Remove `token` from the live set. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) {
        if self.live.remove(&hash_token(token)).is_none() {
            tracing::debug!("Revoke called for a refresh token that is not live");
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
