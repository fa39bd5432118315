//! Login, access token refresh and refresh token revocation.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::ApiError;
use super::users::UserResponse;
use crate::auth::{AuthError, bearer_token};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    access_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    access_token: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: session.user.into(),
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)?;

    // An unknown refresh token is a failed authentication here, not a
    // missing resource.
    let access_token = match state.sessions.refresh(token).await {
        Err(AuthError::NotFound) => return Err(ApiError::unauthorized("Invalid refresh token")),
        other => other?,
    };

    Ok(Json(RefreshResponse { access_token }))
}

async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)?;
    state.sessions.revoke(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
