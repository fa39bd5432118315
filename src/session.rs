//! Login sessions: password login, access token refresh, and revocation.
//!
//! A session starts at login, which issues a one-hour access token and a
//! 60-day opaque refresh token. The refresh token is stored and can mint new
//! access tokens until it expires or is revoked. It is never rotated.
//!
//! ```text
//! (none) -> ISSUED -> [REFRESHED]* -> (REVOKED | EXPIRED)
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{AuthError, DUMMY_DIGEST, generate_refresh_token, verify_password};
use crate::db::{Database, RefreshToken, User};
use crate::jwt::{JwtCodec, now_secs};

/// Refresh token duration: 60 days
pub const REFRESH_TOKEN_DURATION_SECS: i64 = 60 * 24 * 60 * 60;

/// Persistence for refresh token records.
///
/// Each call must be atomic for its row. No cross-row transactions are needed.
pub trait SessionStore {
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<RefreshToken>, sqlx::Error>> + Send;

    fn insert(
        &self,
        token: &str,
        owner: Uuid,
        expires_at: i64,
    ) -> impl Future<Output = Result<RefreshToken, sqlx::Error>> + Send;

    /// Returns false if the token does not exist.
    fn mark_revoked(
        &self,
        token: &str,
        revoked_at: i64,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

/// Lookup of password records by email.
pub trait CredentialStore {
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

impl SessionStore for Database {
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        self.refresh_tokens().find_by_token(token).await
    }

    async fn insert(
        &self,
        token: &str,
        owner: Uuid,
        expires_at: i64,
    ) -> Result<RefreshToken, sqlx::Error> {
        self.refresh_tokens().insert(token, owner, expires_at).await
    }

    async fn mark_revoked(&self, token: &str, revoked_at: i64) -> Result<bool, sqlx::Error> {
        self.refresh_tokens().mark_revoked(token, revoked_at).await
    }
}

impl CredentialStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.users().get_by_email(email).await
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates the session lifecycle. The only code that creates or revokes
/// refresh token records.
pub struct SessionManager<B> {
    backend: B,
    codec: Arc<JwtCodec>,
}

impl<B> SessionManager<B>
where
    B: SessionStore + CredentialStore + Send + Sync,
{
    pub fn new(backend: B, codec: Arc<JwtCodec>) -> Self {
        Self { backend, codec }
    }

    /// Verify email and password, then issue an access token and a new
    /// persisted refresh token.
    ///
    /// An unknown email and a wrong password both fail with
    /// `InvalidCredentials`.
    pub async fn login(&self, email: &str, secret: &str) -> Result<LoginSession, AuthError> {
        let user = self.backend.find_user_by_email(email).await?;

        // An unknown email still pays for a full verification.
        let digest = user.as_ref().map_or(DUMMY_DIGEST, |u| u.hashed_password.as_str());
        let password_ok = verify_password(secret, digest).await?;

        let user = match user {
            Some(user) if password_ok => user,
            Some(user) => {
                debug!(user_id = %user.id, "Login attempt with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access_token = self.codec.issue(user.id)?;
        let refresh_token = generate_refresh_token()?;
        let expires_at = now_secs() as i64 + REFRESH_TOKEN_DURATION_SECS;

        self.backend.insert(&refresh_token, user.id, expires_at).await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a stored refresh token. The refresh token
    /// record is left untouched.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let record = self
            .backend
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::NotFound)?;

        if record.revoked_at.is_some() {
            return Err(AuthError::SessionRevoked);
        }
        if now_secs() as i64 >= record.expires_at {
            return Err(AuthError::SessionExpired);
        }

        self.codec.issue(record.user_id)
    }

    /// Revoke a refresh token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let record = self
            .backend
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::NotFound)?;

        // The row can disappear between the lookup and the update if its
        // owner is deleted.
        if !self
            .backend
            .mark_revoked(refresh_token, now_secs() as i64)
            .await?
        {
            return Err(AuthError::NotFound);
        }

        info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }
}
