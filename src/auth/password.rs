//! One-way password storage with argon2id.
//!
//! Hashing and verification are CPU-heavy, so the public functions run them on
//! tokio's blocking pool and never on a runtime worker.

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::TryRngCore;
use rand::rngs::OsRng;
use tokio::task;

use super::AuthError;

const SALT_LEN: usize = 16;

/// Well-formed digest with the default parameters that no password matches.
/// Verified against when a login names an unknown email, so a miss costs the
/// same as a wrong password.
pub const DUMMY_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$AimXKoSpHuxCi9cJ7mBIyg$GjLvTisO8etLfB8iYSYktGLRCiGAUxoYVNi10EA9cf8";

/// Hash a password into a PHC string (`$argon2id$...`) with a fresh random salt.
pub async fn hash_password(secret: &str) -> Result<String, AuthError> {
    let secret = secret.to_owned();
    task::spawn_blocking(move || hash_blocking(&secret))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            AuthError::HashingFailure
        })?
}

/// Check a password against a stored digest.
///
/// A mismatch is `Ok(false)`; only a digest that can't be parsed is an error.
pub async fn verify_password(secret: &str, digest: &str) -> Result<bool, AuthError> {
    let secret = secret.to_owned();
    let digest = digest.to_owned();
    task::spawn_blocking(move || verify_blocking(&secret, &digest))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            AuthError::HashingFailure
        })?
}

fn hash_blocking(secret: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.try_fill_bytes(&mut salt).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed while salting password");
        AuthError::HashingFailure
    })?;
    let salt = SaltString::encode_b64(&salt).map_err(|_| AuthError::HashingFailure)?;

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::HashingFailure
        })
}

fn verify_blocking(secret: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest).map_err(|_| AuthError::HashingFailure)?;

    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            tracing::error!(error = %e, "Password verification failed");
            Err(AuthError::HashingFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let digest = hash_password("pw1").await.unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let digest = hash_password("correct horse").await.unwrap();
        assert!(!verify_password("battery staple", &digest).await.unwrap());
        assert!(!verify_password("", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_salted() {
        let a = hash_password("same").await.unwrap();
        let b = hash_password("same").await.unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).await.unwrap());
        assert!(verify_password("same", &b).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_digest() {
        assert!(matches!(
            verify_password("pw", "not-a-phc-string").await,
            Err(AuthError::HashingFailure)
        ));
    }

    #[test]
    fn test_dummy_digest_matches_default_cost() {
        let parsed = PasswordHash::new(DUMMY_DIGEST).unwrap();
        let params = Params::try_from(&parsed).unwrap();
        let defaults = Params::default();

        assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());
    }

    #[tokio::test]
    async fn test_dummy_digest_runs_full_verification() {
        // A parse failure would be an error; a completed verify is a mismatch.
        for secret in ["", "pw1", "password"] {
            assert!(!verify_password(secret, DUMMY_DIGEST).await.unwrap());
        }
    }
}
