use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::AppState;
use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, hash_password};
use crate::db::{User, is_unique_violation};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_user).put(update_user))
        .with_state(state)
}

#[derive(Deserialize)]
pub(super) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<&str, ApiError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ApiError::bad_request("Email cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(ApiError::bad_request("Password cannot be empty"));
        }
        Ok(email)
    }
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Serialize)]
pub(super) struct UserResponse {
    pub id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

async fn hash_or_internal(password: &str) -> Result<String, ApiError> {
    hash_password(password).await.map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to hash password")
    })
}

async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.validate()?;
    let hashed = hash_or_internal(&payload.password).await?;

    let user = match state.db.users().create(email, &hashed).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn update_user(
    State(state): State<AppState>,
    Auth(user_id): Auth,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.validate()?;
    let hashed = hash_or_internal(&payload.password).await?;

    let updated = match state
        .db
        .users()
        .update_credentials(user_id, email, &hashed)
        .await
    {
        Ok(updated) => updated,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to update user", e)),
    };

    let user = updated.ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(user_id = %user.id, "User credentials updated");
    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_validate_trims_email() {
        assert_eq!(request("  a@x.com ", "pw").validate().unwrap(), "a@x.com");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(matches!(
            request("   ", "pw").validate(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            request("a@x.com", "").validate(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_user_response_omits_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            hashed_password: "$argon2id$secret".into(),
            is_chirpy_red: false,
            created_at: "t0".into(),
            updated_at: "t1".into(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["is_chirpy_red"], false);
    }
}
