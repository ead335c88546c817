//! Authentication module for the Douban scraper API
//!
//! Optional HTTP basic auth in front of every route. When no credentials are
//! configured the middleware lets every request through.

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, ResponseError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::config::BasicCredentials;
use crate::error::AppError;

/// Realm advertised in the `WWW-Authenticate` challenge
pub const BASIC_REALM: &str = "Authorization Required";

/// Authentication errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
}

/// Configuration for the basic auth middleware
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Accepted credentials; `None` disables the check
    pub credentials: Option<BasicCredentials>,
}

/// Decode a `Basic base64(user:pass)` header into its username and password
pub fn extract_basic_credentials(auth_header: &str) -> Result<(String, String), AuthError> {
    let encoded = auth_header
        .strip_prefix("Basic ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::InvalidAuthHeaderFormat)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeaderFormat)?;

    decoded
        .split_once(':')
        .map(|(user, pass)| (user.to_string(), pass.to_string()))
        .ok_or(AuthError::InvalidAuthHeaderFormat)
}

/// Check a request's `Authorization` header against the expected credentials
pub fn validate_request(req: &ServiceRequest, expected: &BasicCredentials) -> Result<(), AuthError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let (username, password) = extract_basic_credentials(auth_header)?;
    check_credentials(&username, &password, expected)
}

/// Compare presented credentials with the expected pair
///
/// Both fields are always compared, and each comparison takes the same time
/// whatever the input length or contents.
pub fn check_credentials(
    username: &str,
    password: &str,
    expected: &BasicCredentials,
) -> Result<(), AuthError> {
    let user_ok = digests_equal(username, &expected.username);
    let pass_ok = digests_equal(password, &expected.password);
    if user_ok & pass_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

fn digests_equal(a: &str, b: &str) -> bool {
    let (a, b) = (Sha256::digest(a.as_bytes()), Sha256::digest(b.as_bytes()));
    a.iter().zip(b.iter()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Middleware enforcing basic auth when [`AuthConfig`] carries credentials
///
/// Register with `actix_web::middleware::from_fn(require_basic_auth)`.
pub async fn require_basic_auth<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let credentials = req
        .app_data::<web::Data<AuthConfig>>()
        .and_then(|config| config.credentials.clone());

    if let Some(expected) = credentials {
        if let Err(e) = validate_request(&req, &expected) {
            warn!("Rejected {} {}: {}", req.method(), req.path(), e);
            let response = AppError::from(e).error_response().map_into_right_body();
            return Ok(req.into_response(response));
        }
    }

    Ok(next.call(req).await?.map_into_left_body())
}
