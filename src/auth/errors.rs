//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Every way a credential or session operation can fail.
///
/// Leaf components (password vault, token codec, opaque token generator,
/// header extraction) raise the first group; the session manager and the
/// authorization gate raise the rest.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No credential provided")]
    MissingCredential,
    #[error("Malformed token")]
    MalformedToken,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token was not issued for this purpose")]
    WrongIssuer,
    #[error("Token has expired")]
    Expired,
    #[error("Token subject is not a valid user id")]
    InvalidSubject,
    #[error("Password hashing failed")]
    HashingFailure,
    #[error("Secure random source unavailable")]
    EntropyFailure,
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Unknown email and wrong password share this variant on purpose.
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Refresh token has expired")]
    SessionExpired,
    #[error("Refresh token has been revoked")]
    SessionRevoked,
    #[error("Refresh token not found")]
    NotFound,

    #[error("You do not own this resource")]
    Forbidden,
    #[error("Invalid API key")]
    Unauthorized,

    #[error("Session storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AuthError {
    /// True for errors caused by infrastructure rather than by the caller's
    /// credentials. These are the only ones worth retrying.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Signing(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "Database error".to_string(),
            Self::Signing(_) => "Failed to generate token".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "Authentication backend failure");
        }
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
