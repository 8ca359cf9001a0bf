/// Authentication Routes
///
/// Thin HTTP adapter over the session coordinator: sign-up, sign-in,
/// access-token refresh, logout, identity listing and the current identity.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, SessionCoordinator};
use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_password};

/// Sign-up and sign-in request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Refresh and logout request. A missing token is a domain error, not a
/// malformed body.
#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub email: String,
    pub expires_at: i64,
}

fn access_response(sessions: &SessionCoordinator, access_token: String) -> AccessTokenResponse {
    AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: sessions.policy().access_ttl.num_seconds(),
    }
}

/// POST /auth/signup
///
/// Register a new identity and return an access token. No refresh token is
/// issued; clients sign in to get one.
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
pub async fn sign_up(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let CredentialsRequest { email, password } = form.into_inner();
    let email = is_valid_email(&email)?;
    is_valid_password(&password)?;

    // bcrypt is slow on purpose; keep it off the async workers
    let coordinator = sessions.clone();
    let access_token = web::block(move || coordinator.sign_up(&email, &password)).await??;

    Ok(HttpResponse::Created().json(access_response(&sessions, access_token)))
}

/// POST /auth/signin
///
/// # Errors
/// - 400: Invalid email format
/// - 401: Unknown email or wrong password (same response for both)
pub async fn sign_in(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let CredentialsRequest { email, password } = form.into_inner();
    let email = is_valid_email(&email)?;

    let coordinator = sessions.clone();
    let tokens = web::block(move || coordinator.sign_in(&email, &password)).await??;

    Ok(HttpResponse::Ok().json(SignInResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: sessions.policy().access_ttl.num_seconds(),
    }))
}

/// POST /auth/token
///
/// Exchange a live refresh token for a new access token. The refresh token
/// stays valid until logout or expiry.
///
/// # Errors
/// - 401: No refresh token supplied
/// - 403: Refresh token unknown, revoked, expired or forged
pub async fn refresh_token(
    form: web::Json<RefreshRequest>,
    sessions: web::Data<SessionCoordinator>,
) -> Result<HttpResponse, AppError> {
    let access_token = sessions.refresh_access_token(form.refresh_token.as_deref())?;

    Ok(HttpResponse::Ok().json(access_response(&sessions, access_token)))
}

/// POST /auth/logout
///
/// Revoke a refresh token. Always answers 204.
pub async fn log_out(
    form: web::Json<RefreshRequest>,
    sessions: web::Data<SessionCoordinator>,
) -> HttpResponse {
    sessions.log_out(form.refresh_token.as_deref());
    HttpResponse::NoContent().finish()
}

/// GET /api/users
///
/// Registered identities. Requires an access token; never includes password
/// hashes.
pub async fn list_users(sessions: web::Data<SessionCoordinator>) -> HttpResponse {
    HttpResponse::Ok().json(sessions.list_identities())
}

/// GET /api/me
///
/// The identity the presented access token was issued to.
pub async fn me(claims: web::ReqData<Claims>) -> HttpResponse {
    let claims = claims.into_inner();
    HttpResponse::Ok().json(MeResponse {
        email: claims.email,
        expires_at: claims.exp,
    })
}
