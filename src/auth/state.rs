//! Authentication state traits.

use super::gate::ServiceKey;
use crate::jwt::JwtCodec;

/// State types that can verify access tokens.
pub trait HasAuthBackend {
    fn codec(&self) -> &JwtCodec;
}

/// State types that hold the webhook service key.
pub trait HasServiceKey {
    fn service_key(&self) -> &ServiceKey;
}
