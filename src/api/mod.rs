mod admin;
mod chirps;
mod error;
mod sessions;
mod users;
mod webhooks;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::auth::{HasAuthBackend, HasServiceKey, ServiceKey};
use crate::db::Database;
use crate::jwt::JwtCodec;
use crate::session::SessionManager;

pub use error::ApiError;

/// Server context shared by every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtCodec>,
    pub sessions: Arc<SessionManager<Database>>,
    pub polka_key: ServiceKey,
    /// Enables destructive dev-only endpoints
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &[u8], polka_key: ServiceKey, dev_mode: bool) -> Self {
        let jwt = Arc::new(JwtCodec::new(jwt_secret));
        let sessions = Arc::new(SessionManager::new(db.clone(), jwt.clone()));
        Self {
            db,
            jwt,
            sessions,
            polka_key,
            dev_mode,
        }
    }
}

impl HasAuthBackend for AppState {
    fn codec(&self) -> &JwtCodec {
        &self.jwt
    }
}

impl HasServiceKey for AppState {
    fn service_key(&self) -> &ServiceKey {
        &self.polka_key
    }
}

/// Create the `/api` router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(sessions::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/chirps", chirps::router(state.clone()))
        .nest("/polka", webhooks::router(state))
}

/// Create the `/admin` router.
pub fn create_admin_router(state: AppState) -> Router {
    admin::router(state)
}

async fn healthz() -> &'static str {
    "OK"
}
