use actix_web::{web, HttpResponse};
use tracing::{error, info};

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::service::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::error::AppError;
use crate::AppState;

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for email: {}", req.email);
    match state.auth.register(&req).await {
        Ok(response) => {
            info!("Registration successful for email: {}", req.email);
            Ok(HttpResponse::Created().json(response))
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for: {}", req.email_or_username);
    match state.auth.login(&req).await {
        Ok(response) => {
            info!("Login successful for: {}", req.email_or_username);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            error!("Login failed for: {}: {}", req.email_or_username, e);
            Err(e)
        }
    }
}

pub async fn refresh(
    req: web::Json<RefreshRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // The token value itself is never logged.
    let response = state.auth.refresh(&req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn logout(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.auth.logout(user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully logged out"
    })))
}

/// Returns the claims the validator injected for the presented bearer
/// token.
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": user.user_id,
        "email": user.email,
        "username": user.username,
    })))
}
