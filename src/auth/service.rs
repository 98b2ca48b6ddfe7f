use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::{RefreshToken, User, UserInfo};
use crate::db::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AppError, AuthError};
use crate::security::password::CredentialHasher;
use crate::security::token::{AccessClaims, TokenError, TokenSigner};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Coordinates hasher, signer and the two stores into the
/// register/login/refresh/logout operations and enforces refresh-token
/// rotation.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    signer: TokenSigner,
    hasher: CredentialHasher,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        signer: TokenSigner,
        hasher: CredentialHasher,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            signer,
            hasher,
            refresh_ttl,
        }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError> {
        validate_registration(req)?;

        // Check-then-act: the unique constraints in the store remain the
        // safety net for concurrent registrations (see error mapping).
        if self.users.exists_by_email(&req.email).await? {
            return Err(AuthError::DuplicateEmail.into());
        }
        if self.users.exists_by_username(&req.username).await? {
            return Err(AuthError::DuplicateUsername.into());
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = User::new(
            req.email.clone(),
            req.username.clone(),
            password_hash,
            req.first_name.clone(),
            req.last_name.clone(),
        );
        let user = self.users.create(&user).await?;

        info!("Registered user {}", user.id);
        self.issue_pair(&user).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AppError> {
        // Email first, then username; first match wins. Uniqueness holds
        // within each field, not across them.
        let user = match self.users.get_by_email(&req.email_or_username).await? {
            Some(user) => Some(user),
            None => self.users.get_by_username(&req.email_or_username).await?,
        };
        let user = user.ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::UserInactive.into());
        }

        if !self.hasher.verify(&user.password_hash, &req.password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        // Best effort; a failed timestamp write must not fail the login.
        if let Err(e) = self.users.update_last_login(user.id).await {
            warn!("Failed to update last login for {}: {}", user.id, e);
        }

        info!("User {} logged in", user.id);
        self.issue_pair(&user).await
    }

    /// Exchanges a refresh token for a new access+refresh pair, rotating
    /// out the presented token. The presented value never satisfies a
    /// `get_valid` lookup again.
    pub async fn refresh(&self, refresh_value: &str) -> Result<AuthResponse, AppError> {
        let stored = self
            .refresh_tokens
            .get_valid(refresh_value)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .get_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::UserInactive.into());
        }

        // Revocation must land before the new pair exists. The conditional
        // update means a concurrent replay of the same token yields exactly
        // one winner; the loser is told the token is invalid.
        if !self.refresh_tokens.revoke(&stored.token).await? {
            warn!("Refresh token for {} already spent", user.id);
            return Err(AuthError::InvalidToken.into());
        }

        self.issue_pair(&user).await
    }

    /// Revokes every refresh token the user owns. Already-issued access
    /// tokens stay valid until natural expiry; the short access TTL is the
    /// mitigation.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        let revoked = self.refresh_tokens.revoke_all(user_id).await?;
        info!("Logged out user {}, revoked {} refresh tokens", user_id, revoked);
        Ok(())
    }

    /// Verification contract consumed at the trust boundary.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.signer.verify(token)
    }

    async fn issue_pair(&self, user: &User) -> Result<AuthResponse, AppError> {
        let access_token = self.signer.issue_access(user.id, &user.email, &user.username)?;
        let refresh_value = self.signer.issue_refresh()?;

        let record = RefreshToken::new(user.id, refresh_value.clone(), self.refresh_ttl);
        self.refresh_tokens.create(&record).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token: refresh_value,
            token_type: "Bearer".to_string(),
            expires_in: self.signer.access_ttl().num_seconds(),
            user: UserInfo::from(user),
        })
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("A valid email is required".into()));
    }
    if req.username.len() < 3 || req.username.len() > 50 {
        return Err(AppError::ValidationError(
            "Username must be between 3 and 50 characters".into(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}
