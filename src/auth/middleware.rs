//! Trust-boundary token validation.
//!
//! Handlers that take an [`AuthenticatedUser`] argument only run for
//! requests carrying a verifiable bearer token; everything else is
//! rejected with a uniform 401 before the handler body executes.

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Claims injected into the request context after bearer validation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state not configured".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::InvalidToken)?;

    // Logs keep the malformed/expired/bad-signature distinction; the
    // response does not.
    let claims = state.auth.verify_access(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AuthError::InvalidToken
    })?;

    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
        username: claims.username,
    })
}
