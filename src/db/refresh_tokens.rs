//! Refresh token storage.
//!
//! Rows are never deleted on revocation; `revoked_at` is set instead.
//! Access tokens are stateless and never stored.

use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::parse_uuid;

/// A persisted refresh token record.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    /// Unix seconds
    pub expires_at: i64,
    /// Unix seconds, None while the token is active
    pub revoked_at: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: String,
    created_at: String,
    updated_at: String,
    expires_at: i64,
    revoked_at: Option<i64>,
}

impl TryFrom<RefreshTokenRow> for RefreshToken {
    type Error = sqlx::Error;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        Ok(Self {
            token: row.token,
            user_id: parse_uuid(&row.user_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        })
    }
}

/// Store for refresh token records.
#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new, unrevoked refresh token.
    pub async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: i64,
    ) -> Result<RefreshToken, sqlx::Error> {
        let row: RefreshTokenRow = sqlx::query_as(
            "INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES (?, ?, ?)
             RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at",
        )
        .bind(token)
        .bind(user_id.to_string())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    /// Look up a refresh token by its value.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RefreshToken::try_from).transpose()
    }

    /// Set `revoked_at`. A second call overwrites the timestamp (last write wins).
    /// Returns false if no such token exists.
    pub async fn mark_revoked(&self, token: &str, revoked_at: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens
             SET revoked_at = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE token = ?",
        )
        .bind(revoked_at)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
