//! Credentials and per-request authorization.
//!
//! Passwords are stored as argon2id digests. Access tokens are short-lived
//! signed JWTs (see `crate::jwt`); refresh tokens are opaque random strings
//! whose meaning lives only in the database (see `crate::session`).

mod errors;
mod extractors;
mod gate;
mod header;
mod opaque;
mod password;
mod state;

pub use errors::AuthError;
pub use extractors::{Auth, ServiceAuth};
pub use gate::{ServiceKey, require_owner, require_service_key, require_user};
pub use header::{api_key, bearer_token};
pub use opaque::{REFRESH_TOKEN_BYTES, generate_refresh_token};
pub use password::{DUMMY_DIGEST, hash_password, verify_password};
pub use state::{HasAuthBackend, HasServiceKey};
