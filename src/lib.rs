pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod security;

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;

pub use auth::{AuthService, AuthenticatedUser};
pub use config::Settings;
pub use db::{RefreshToken, User, UserInfo};
pub use error::AppError;

use db::postgres::{PgRefreshTokenRepository, PgUserRepository};
use db::repository::{RefreshTokenRepository, UserRepository};
use error::DatabaseError;
use security::{CredentialHasher, TokenSigner};

pub type Result<T> = std::result::Result<T, AppError>;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl AppState {
    /// Connects to Postgres, runs migrations and wires the production
    /// repositories.
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database.url)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::QueryError(e.to_string())))?;

        let pool = Arc::new(pool);
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
        let refresh_tokens: Arc<dyn RefreshTokenRepository> =
            Arc::new(PgRefreshTokenRepository::new(pool));

        Ok(Self::with_repositories(config, users, refresh_tokens))
    }

    /// Builds the state over arbitrary repository implementations. Tests
    /// use this with the in-memory stores.
    pub fn with_repositories(
        config: Settings,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        let signer = TokenSigner::new(
            &config.auth.jwt_secret,
            chrono::Duration::seconds(config.auth.access_token_ttl_secs as i64),
        );
        let hasher = CredentialHasher::new(config.auth.bcrypt_cost);
        let auth = AuthService::new(
            users,
            refresh_tokens.clone(),
            signer,
            hasher,
            chrono::Duration::seconds(config.auth.refresh_token_ttl_secs as i64),
        );

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            refresh_tokens,
        }
    }
}
