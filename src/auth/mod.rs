/// Authentication module
///
/// Token issuance/verification, password hashing, the refresh token
/// registry and the session coordinator that ties them together.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use jwt::{TokenError, TokenIssuer};
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use refresh_token::RefreshTokenRegistry;
pub use session::{IdentitySummary, SessionCoordinator, SessionPolicy, SignInTokens};
