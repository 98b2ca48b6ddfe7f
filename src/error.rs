use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::security::token::TokenError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Domain-level authentication failures. These are expected outcomes with
/// stable codes, not faults; the messages are safe to return to clients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Invalid email/username or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    UserInactive,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// Unique-constraint violations are the safety net behind the duplicate
// pre-checks in register; surface them as the matching domain error instead
// of a generic query failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::DatabaseError(DatabaseError::NotFound),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                match db_err.constraint() {
                    Some(c) if c.contains("email") => AppError::AuthError(AuthError::DuplicateEmail),
                    Some(c) if c.contains("username") => AppError::AuthError(AuthError::DuplicateUsername),
                    _ => AppError::DatabaseError(DatabaseError::Duplicate),
                }
            }
            _ => AppError::DatabaseError(DatabaseError::QueryError(err.to_string())),
        }
    }
}

// Token verification detail (malformed/bad-signature/expired) stays internal;
// the boundary only ever sees InvalidToken.
impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::AuthError(AuthError::InvalidToken)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl AppError {
    /// Stable machine-readable code included in every error response.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::DuplicateEmail | AuthError::DuplicateUsername => "user_exists",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::UserInactive => "user_inactive",
                // A refresh token whose owner is gone is indistinguishable
                // from any other bad token at the boundary.
                AuthError::UserNotFound | AuthError::InvalidToken => "invalid_token",
            },
            AppError::ValidationError(_) => "validation_error",
            _ => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::AuthError(AuthError::UserNotFound) => AuthError::InvalidToken.to_string(),
            AppError::AuthError(e) => e.to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            // Infrastructure faults are logged with full context but
            // surfaced generically.
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.error_code(),
            "message": self.client_message(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::DuplicateEmail | AuthError::DuplicateUsername => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserInactive => StatusCode::FORBIDDEN,
                AuthError::UserNotFound | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            },
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
