//! Global error handling module for the Douban scraper API
//!
//! This module provides a unified error type that handles all application errors
//! and converts them to appropriate HTTP responses with consistent JSON structure.

use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::auth::{AuthError, BASIC_REALM};
use crate::models::ApiError;
use crate::scraper::ScraperError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Scraping-related errors (network, gate, HTTP, parsing)
    #[error("Scraping error: {0}")]
    Scraping(#[from] ScraperError),

    /// Authentication-related errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Scraping(ScraperError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,

            // 404 Not Found, passed through from Douban
            AppError::Scraping(ScraperError::HttpError(404)) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway - Douban failed or answered with something unusable
            AppError::Scraping(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),

            AppError::Auth(auth_err) => match auth_err {
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::MissingAuthHeader => "Authorization header is required".to_string(),
                AuthError::InvalidAuthHeaderFormat => {
                    "Invalid authorization header format, expected 'Basic <credentials>'"
                        .to_string()
                }
            },

            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::NetworkError(msg) => format!("Failed to connect to Douban: {}", msg),
                ScraperError::HttpError(404) => "Resource not found on Douban".to_string(),
                ScraperError::HttpError(status) => {
                    format!("Douban returned error status: {}", status)
                }
                ScraperError::ResponseError(msg) => format!("Failed to read response: {}", msg),
                ScraperError::ChallengeParseError | ScraperError::ChallengeConfirmError(_) => {
                    "Douban anti-automation check could not be passed, please try again later"
                        .to_string()
                }
                ScraperError::DocumentParseError(msg) => {
                    format!("Failed to parse Douban response: {}", msg)
                }
                ScraperError::InvalidUrl(msg) => format!("Invalid URL: {}", msg),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        let mut builder = HttpResponse::build(status);
        if let AppError::Auth(_) = self {
            let challenge = format!("Basic realm=\"{}\"", BASIC_REALM);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                builder.insert_header((WWW_AUTHENTICATE, value));
            }
        }
        builder.json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
