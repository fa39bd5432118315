//! Admin API endpoints.
//!
//! Only available when the server runs in dev mode.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Serialize;
use tracing::{info, warn};

use super::AppState;
use super::error::{ApiError, ResultExt};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/reset", post(reset))
        .with_state(state)
}

#[derive(Serialize)]
struct ResetResponse {
    deleted_users: u64,
}

/// Delete every user, along with their chirps and refresh tokens.
async fn reset(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if !state.dev_mode {
        warn!("Reset attempted outside dev mode");
        return Err(ApiError::forbidden("Reset is only allowed in dev mode"));
    }

    let deleted_users = state
        .db
        .users()
        .delete_all()
        .await
        .db_err("Failed to reset users")?;

    info!(deleted_users, "Database reset");
    Ok(Json(ResetResponse { deleted_users }))
}
