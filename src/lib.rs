pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod session;

use api::{AppState, create_admin_router, create_api_router};
use auth::ServiceKey;
use axum::Router;
use db::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// Shared key the payment provider sends with webhooks
    pub polka_key: ServiceKey,
    /// Enables `/admin/reset`
    pub dev_mode: bool,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let state = AppState::new(
        config.db.clone(),
        &config.jwt_secret,
        config.polka_key.clone(),
        config.dev_mode,
    );

    Router::new()
        .nest("/api", create_api_router(state.clone()))
        .nest("/admin", create_admin_router(state))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    Ok((handle, local_addr))
}
