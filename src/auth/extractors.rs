//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::AuthError;
use super::gate::{require_service_key, require_user};
use super::state::{HasAuthBackend, HasServiceKey};

/// Extractor for endpoints that need some authenticated user.
/// Resolves the bearer access token to the user's id.
pub struct Auth(pub Uuid);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_user(&parts.headers, state.codec()).map(Auth)
    }
}

/// Extractor for the trusted webhook caller. Carries no identity.
pub struct ServiceAuth;

impl<S> FromRequestParts<S> for ServiceAuth
where
    S: HasServiceKey + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_service_key(&parts.headers, state.service_key())?;
        Ok(ServiceAuth)
    }
}
