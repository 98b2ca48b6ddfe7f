use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{RefreshToken, User};
use crate::error::AppError;

/// Capability interface over the user directory. Swappable between the
/// Postgres implementation and an in-memory one for tests.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. A unique-constraint violation surfaces as
    /// `DuplicateEmail` / `DuplicateUsername`.
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;
    async fn update_last_login(&self, id: Uuid) -> Result<(), AppError>;
}

/// Durable store of issued refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> Result<RefreshToken, AppError>;

    /// Returns the row only if `now < expires_at` and it has not been
    /// revoked; expired or revoked tokens read as not found.
    async fn get_valid(&self, value: &str) -> Result<Option<RefreshToken>, AppError>;

    /// Conditional revocation: flips `is_revoked` only where it is still
    /// false and reports whether a row actually changed. A `false` return
    /// means the token was already spent, which rotation treats as an
    /// invalid token.
    async fn revoke(&self, value: &str) -> Result<bool, AppError>;

    /// Revokes every live token owned by the user; returns how many were
    /// affected. Idempotent.
    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError>;

    /// Deletes expired rows. Housekeeping only; never called on a request
    /// path.
    async fn delete_expired(&self) -> Result<u64, AppError>;
}
