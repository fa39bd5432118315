//! Opaque refresh token values.

use rand::TryRngCore;
use rand::rngs::OsRng;

use super::AuthError;

/// Random bytes per refresh token. Hex encoding doubles the length.
pub const REFRESH_TOKEN_BYTES: usize = 256;

/// Generate a refresh token: 256 bytes from the OS random source, hex-encoded
/// to 512 lowercase characters.
///
/// Fails with `EntropyFailure` if the OS source is unavailable. There is no
/// fallback to a userspace generator.
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        AuthError::EntropyFailure
    })?;
    Ok(hex::encode(bytes))
}
