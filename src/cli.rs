//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::ServiceKey;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info, warn};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirpy", about = "Short message service with token authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "chirpy.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Path to file containing the Polka webhook key. Prefer using POLKA_KEY env var instead
    #[arg(long)]
    pub polka_key_file: Option<String>,

    /// Enable dev-only endpoints such as /admin/reset. Also set by PLATFORM=dev
    #[arg(long)]
    pub dev: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from an environment variable, falling back to a file.
/// The environment variable is cleared after reading.
fn load_secret(env_var: &str, file: Option<&str>, file_flag: &str) -> Option<String> {
    if let Ok(secret) = std::env::var(env_var) {
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        return Some(secret);
    }

    let Some(path) = file else {
        error!(
            "{} is required. Set the {} environment variable (recommended) or use {}",
            env_var, env_var, file_flag
        );
        return None;
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to read {} file", env_var);
            None
        }
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = load_secret("JWT_SECRET", jwt_secret_file, "--jwt-secret-file")?;

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load the Polka webhook key from environment variable or file.
pub fn load_polka_key(polka_key_file: Option<&str>) -> Option<ServiceKey> {
    let key = load_secret("POLKA_KEY", polka_key_file, "--polka-key-file")?;

    if key.is_empty() {
        error!("Polka key cannot be empty");
        return None;
    }

    Some(ServiceKey::new(key))
}

/// Dev mode is on if `--dev` is passed or `PLATFORM=dev` is set.
pub fn dev_mode_enabled(flag: bool) -> bool {
    flag || std::env::var("PLATFORM").is_ok_and(|p| p == "dev")
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    polka_key: ServiceKey,
    dev_mode: bool,
) -> ServerConfig {
    if dev_mode {
        warn!("Dev mode enabled, /admin/reset will delete all users");
    }

    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        polka_key,
        dev_mode,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
