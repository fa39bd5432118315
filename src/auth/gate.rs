//! Per-request authorization checks.
//!
//! These functions only look at request headers and the values handed to
//! them; none of them touch storage. Handlers fetch whatever resource they
//! need and pass its owner in.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::AuthError;
use super::header::{api_key, bearer_token};
use crate::jwt::JwtCodec;

/// Static shared secret for the single trusted webhook caller.
#[derive(Clone)]
pub struct ServiceKey(String);

impl ServiceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Constant-time comparison against a presented key.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl std::fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceKey(..)")
    }
}

/// Resolve the authenticated user from a bearer access token.
pub fn require_user(headers: &HeaderMap, codec: &JwtCodec) -> Result<Uuid, AuthError> {
    let token = bearer_token(headers)?;
    codec.verify(token)
}

/// Resolve the authenticated user and require that they own the resource.
pub fn require_owner(
    headers: &HeaderMap,
    codec: &JwtCodec,
    resource_owner: Uuid,
) -> Result<Uuid, AuthError> {
    let user = require_user(headers, codec)?;
    if user != resource_owner {
        return Err(AuthError::Forbidden);
    }
    Ok(user)
}

/// Require `Authorization: ApiKey <key>` matching the configured service key.
pub fn require_service_key(headers: &HeaderMap, expected: &ServiceKey) -> Result<(), AuthError> {
    let presented = api_key(headers)?;
    if !expected.matches(presented) {
        return Err(AuthError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn codec() -> JwtCodec {
        JwtCodec::new(b"gate-test-secret")
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_require_user() {
        let codec = codec();
        let user = Uuid::new_v4();
        let token = codec.issue(user).unwrap();

        let headers = headers_with(&format!("Bearer {}", token));
        assert_eq!(require_user(&headers, &codec).unwrap(), user);
    }

    #[test]
    fn test_require_user_propagates_codec_errors() {
        let headers = headers_with("Bearer not-a-jwt");
        assert!(matches!(
            require_user(&headers, &codec()),
            Err(AuthError::MalformedToken)
        ));

        assert!(matches!(
            require_user(&HeaderMap::new(), &codec()),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_require_owner() {
        let codec = codec();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let headers = headers_with(&format!("Bearer {}", codec.issue(owner).unwrap()));

        assert_eq!(require_owner(&headers, &codec, owner).unwrap(), owner);
        assert!(matches!(
            require_owner(&headers, &codec, other),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_require_service_key() {
        let key = ServiceKey::new("f271c81ff7084ee5b99a5091b42d486e");

        let ok = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert!(require_service_key(&ok, &key).is_ok());

        let wrong = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486f");
        assert!(matches!(
            require_service_key(&wrong, &key),
            Err(AuthError::Unauthorized)
        ));

        let prefix_only = headers_with("ApiKey f271");
        assert!(matches!(
            require_service_key(&prefix_only, &key),
            Err(AuthError::Unauthorized)
        ));

        let bearer = headers_with("Bearer f271c81ff7084ee5b99a5091b42d486e");
        assert!(matches!(
            require_service_key(&bearer, &key),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_service_key_debug_is_redacted() {
        let key = ServiceKey::new("super-secret");
        assert!(!format!("{:?}", key).contains("super-secret"));
    }
}
