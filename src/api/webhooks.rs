//! Payment provider (Polka) webhooks.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::ServiceAuth;

const USER_UPGRADED: &str = "user.upgraded";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookRequest {
    event: String,
    #[serde(default)]
    data: WebhookData,
}

#[derive(Deserialize, Default)]
struct WebhookData {
    #[serde(default)]
    user_id: String,
}

async fn polka_webhook(
    State(state): State<AppState>,
    _service: ServiceAuth,
    Json(payload): Json<WebhookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.event != USER_UPGRADED {
        debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = parse_uuid(&payload.data.user_id, "user ID")?;

    let upgraded = state
        .db
        .users()
        .upgrade_to_red(user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    info!(%user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
