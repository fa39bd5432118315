//! Access token generation and validation.
//!
//! Access tokens are HS256 JWTs carrying only the subject user id and the
//! `chirpy-access` issuer tag. They are never stored; the signed string is the
//! whole credential.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::auth::AuthError;

/// Issuer tag for access tokens. Tokens carrying any other tag are rejected.
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// Access token duration: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Grace period after `exp` during which a token still verifies, so a token
/// expires at `exp + CLOCK_SKEW_SECS`.
pub const CLOCK_SKEW_SECS: u64 = 60;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Issuer tag
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Signs and verifies access tokens with the server secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCodec {
    /// Create a new codec with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue an access token for `subject`, valid for one hour from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        self.issue_at(subject, now_secs())
    }

    /// Issue an access token as if the current time were `now`.
    pub fn issue_at(&self, subject: Uuid, now: u64) -> Result<String, AuthError> {
        let claims = AccessClaims {
            sub: subject.to_string(),
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + ACCESS_TOKEN_DURATION_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Verify an access token and return its subject.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, now_secs())
    }

    /// Verify an access token against the clock value `now`.
    ///
    /// Checks run in a fixed order so each failure has exactly one kind:
    /// structure, signature encoding, algorithm, signature, issuer, expiry,
    /// subject.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Uuid, AuthError> {
        let mut segments = token.splitn(3, '.');
        let (Some(header), Some(payload), Some(signature)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(AuthError::MalformedToken);
        };
        if header.is_empty() || payload.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        // Everything after the second dot is the signature. A segment that is
        // not base64url, including one with a stray `.`, can't verify.
        if URL_SAFE_NO_PAD.decode(signature).is_err() {
            return Err(AuthError::BadSignature);
        }

        let header = jsonwebtoken::decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != Algorithm::HS256 {
            return Err(AuthError::MalformedToken);
        }

        // Expiry is checked below so the skew rule is ours, not the library's.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if claims.iss != ACCESS_TOKEN_ISSUER {
            return Err(AuthError::WrongIssuer);
        }

        if now >= claims.exp.saturating_add(CLOCK_SKEW_SECS) {
            return Err(AuthError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)
    }
}
