/// Session Coordinator
///
/// Drives an identity through its session lifecycle:
/// Anonymous -> Registered (sign-up) -> Authenticated (sign-in, live refresh
/// token) -> LoggedOut (refresh token revoked).
///
/// All business rules about when a token may be minted live here. Every
/// failure a caller can observe is one of the `AuthError` kinds; internal
/// errors only come from the hashing or signing backends.

use chrono::Duration;
use serde::Serialize;

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::PasswordHasher;
use crate::auth::refresh_token::RefreshTokenRegistry;
use crate::configuration::Settings;
use crate::error::{AppError, AuthError, StoreError};
use crate::store::{CredentialStore, Identity, InMemoryCredentialStore};

/// Token lifetimes applied by the coordinator
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Tokens handed out by a successful sign-in
#[derive(Debug, Clone)]
pub struct SignInTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Public view of an identity, without credential material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySummary {
    pub email: String,
}

impl From<Identity> for IdentitySummary {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email,
        }
    }
}

pub struct SessionCoordinator<S: CredentialStore = InMemoryCredentialStore> {
    store: S,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    registry: RefreshTokenRegistry,
    policy: SessionPolicy,
}

impl SessionCoordinator<InMemoryCredentialStore> {
    /// Build a coordinator over an empty in-memory store
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            InMemoryCredentialStore::new(),
            PasswordHasher::from_settings(&settings.hashing),
            TokenIssuer::new(&settings.jwt),
            SessionPolicy {
                access_ttl: Duration::seconds(settings.jwt.access_token_expiry),
                refresh_ttl: Duration::seconds(settings.jwt.refresh_token_expiry),
            },
        )
    }
}

impl<S: CredentialStore> SessionCoordinator<S> {
    pub fn new(
        store: S,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            registry: RefreshTokenRegistry::new(),
            policy,
        }
    }

    /// Register a new identity and return an access token for it.
    ///
    /// No refresh token is created; a refreshable session needs a sign-in.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<String, AppError> {
        if self.store.find_by_email(email).is_some() {
            return Err(AuthError::AlreadyExists.into());
        }

        let password_hash = self.hasher.hash(password)?;

        // Another sign-up may have won while we were hashing
        self.store
            .insert(Identity {
                email: email.to_string(),
                password_hash,
            })
            .map_err(|e| match e {
                StoreError::DuplicateIdentity(_) => AppError::Auth(AuthError::AlreadyExists),
            })?;

        let access_token = self.tokens.issue_access(email, self.policy.access_ttl)?;

        tracing::info!(email = %email, "Identity registered");
        Ok(access_token)
    }

    /// Authenticate and open a refreshable session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<SignInTokens, AppError> {
        let identity = self
            .store
            .find_by_email(email)
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &identity.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.tokens.issue_access(email, self.policy.access_ttl)?;
        let refresh_token = self.tokens.issue_refresh(email, self.policy.refresh_ttl)?;
        self.registry.issue(&refresh_token);

        tracing::info!(email = %email, "Identity signed in");
        Ok(SignInTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token.
    ///
    /// The refresh token is left as is; it is neither rotated nor re-issued.
    pub fn refresh_access_token(&self, refresh_token: Option<&str>) -> Result<String, AppError> {
        let refresh_token = match refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::MissingToken.into()),
        };

        if !self.registry.is_live(refresh_token) {
            tracing::debug!("Refresh token is not live");
            return Err(AuthError::InvalidToken.into());
        }

        let claims = self.tokens.verify_refresh(refresh_token).map_err(|e| {
            tracing::debug!(reason = %e, "Live refresh token failed verification");
            AuthError::InvalidToken
        })?;

        let access_token = self.tokens.issue_access(&claims.email, self.policy.access_ttl)?;

        tracing::info!(email = %claims.email, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token. Never fails, whatever is passed in.
    pub fn log_out(&self, refresh_token: Option<&str>) {
        if let Some(token) = refresh_token {
            self.registry.revoke(token);
            tracing::info!("Logout processed");
        }
    }

    /// All registered identities, with password hashes stripped
    pub fn list_identities(&self) -> Vec<IdentitySummary> {
        self.store
            .list()
            .into_iter()
            .map(IdentitySummary::from)
            .collect()
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn registry(&self) -> &RefreshTokenRegistry {
        &self.registry
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::JwtSettings;

    fn coordinator(refresh_ttl: i64) -> SessionCoordinator {
        let jwt = JwtSettings {
            access_secret: "unit-access-secret".to_string(),
            refresh_secret: "unit-refresh-secret".to_string(),
            access_token_expiry: 20,
            refresh_token_expiry: refresh_ttl,
            issuer: "unit".to_string(),
        };
        SessionCoordinator::new(
            InMemoryCredentialStore::new(),
            PasswordHasher::new(4),
            TokenIssuer::new(&jwt),
            SessionPolicy {
                access_ttl: Duration::seconds(20),
                refresh_ttl: Duration::seconds(refresh_ttl),
            },
        )
    }

    fn auth_err<T: std::fmt::Debug>(result: Result<T, AppError>) -> AuthError {
        match result {
            Err(AppError::Auth(e)) => e,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_sign_up_does_not_open_a_session() {
        let sessions = coordinator(30);
        let access = sessions.sign_up("a@x.com", "pw1").unwrap();

        assert!(sessions.tokens().verify_access(&access).is_ok());
        assert!(sessions.registry().is_empty());
    }

    #[test]
    fn test_sign_up_rejects_existing_email() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();

        assert_eq!(auth_err(sessions.sign_up("a@x.com", "pw2")), AuthError::AlreadyExists);
    }

    #[test]
    fn test_sign_in_registers_refresh_token() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();

        let tokens = sessions.sign_in("a@x.com", "pw1").unwrap();

        assert!(sessions.registry().is_live(&tokens.refresh_token));
        assert_eq!(
            sessions.tokens().verify_access(&tokens.access_token).unwrap().email,
            "a@x.com"
        );
    }

    #[test]
    fn test_sign_in_failures_look_the_same() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();

        assert_eq!(auth_err(sessions.sign_in("a@x.com", "wrong")), AuthError::InvalidCredentials);
        assert_eq!(auth_err(sessions.sign_in("b@x.com", "pw1")), AuthError::InvalidCredentials);
        assert!(sessions.registry().is_empty());
    }

    #[test]
    fn test_refresh_missing_token() {
        let sessions = coordinator(30);

        assert_eq!(auth_err(sessions.refresh_access_token(None)), AuthError::MissingToken);
        assert_eq!(auth_err(sessions.refresh_access_token(Some(""))), AuthError::MissingToken);
    }

    #[test]
    fn test_refresh_requires_registration() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();

        // Well-signed and unexpired, but never registered
        let forged = sessions
            .tokens()
            .issue_refresh("a@x.com", Duration::seconds(30))
            .unwrap();

        assert_eq!(
            auth_err(sessions.refresh_access_token(Some(&forged))),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();
        let tokens = sessions.sign_in("a@x.com", "pw1").unwrap();

        // Even if an access token somehow got registered it fails verification
        sessions.registry().issue(&tokens.access_token);
        assert_eq!(
            auth_err(sessions.refresh_access_token(Some(&tokens.access_token))),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_expired_refresh_token_stays_registered_but_fails() {
        let sessions = coordinator(-5);
        sessions.sign_up("a@x.com", "pw1").unwrap();
        let tokens = sessions.sign_in("a@x.com", "pw1").unwrap();

        assert!(sessions.registry().is_live(&tokens.refresh_token));
        assert_eq!(
            auth_err(sessions.refresh_access_token(Some(&tokens.refresh_token))),
            AuthError::InvalidToken
        );
        assert!(sessions.registry().is_live(&tokens.refresh_token));
    }

    #[test]
    fn test_log_out_never_fails() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();
        let tokens = sessions.sign_in("a@x.com", "pw1").unwrap();

        sessions.log_out(Some(&tokens.refresh_token));
        sessions.log_out(Some(&tokens.refresh_token));
        sessions.log_out(Some("garbage"));
        sessions.log_out(None);

        assert!(!sessions.registry().is_live(&tokens.refresh_token));
    }

    #[test]
    fn test_log_out_without_token_leaves_sessions_alone() {
        let sessions = coordinator(30);
        sessions.sign_up("a@x.com", "pw1").unwrap();
        let tokens = sessions.sign_in("a@x.com", "pw1").unwrap();

        sessions.log_out(None);

        assert!(sessions.registry().is_live(&tokens.refresh_token));
    }

    #[test]
    fn test_over_long_password_cannot_sign_in_by_prefix() {
        let sessions = coordinator(30);
        let password = "p".repeat(72);
        sessions.sign_up("a@x.com", &password).unwrap();

        assert_eq!(
            auth_err(sessions.sign_in("a@x.com", &format!("{}WRONG-SUFFIX", password))),
            AuthError::InvalidCredentials
        );
        assert!(sessions.sign_in("a@x.com", &password).is_ok());
    }

    #[test]
    fn test_over_long_password_cannot_sign_up() {
        let sessions = coordinator(30);
        let result = sessions.sign_up("a@x.com", &"p".repeat(73));

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(sessions.list_identities().is_empty());
    }

    #[test]
    fn test_list_identities_strips_hashes() {
        let sessions = coordinator(30);
        sessions.sign_up("b@x.com", "pw1").unwrap();
        sessions.sign_up("a@x.com", "pw2").unwrap();

        let listed = sessions.list_identities();

        assert_eq!(
            listed,
            vec![
                IdentitySummary { email: "a@x.com".to_string() },
                IdentitySummary { email: "b@x.com".to_string() },
            ]
        );
        let json = serde_json::to_string(&listed).unwrap();
        assert!(!json.contains("$2"));
    }
}
