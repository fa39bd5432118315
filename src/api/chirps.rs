use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::AppState;
use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::{Auth, require_owner};
use crate::db::Chirp;

/// Maximum chirp length in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_chirps).post(create_chirp))
        .route("/{chirp_id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

/// Replace banned words with `****`. Words are split on single spaces and
/// compared case-insensitively, so punctuation attached to a word keeps it.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if BANNED_WORDS.contains(&lowered.as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check the length limit and return the cleaned body.
pub fn validate_chirp(body: &str) -> Result<String, ApiError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }
    Ok(clean_body(body))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` sorts ascending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Stable sort by creation time. Chirps with equal timestamps keep their
/// incoming order in both directions.
pub fn sort_chirps(chirps: &mut [Chirp], direction: SortDirection) {
    match direction {
        SortDirection::Asc => chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortDirection::Desc => chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Deserialize)]
struct ListChirpsQuery {
    author_id: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: Uuid,
    created_at: String,
    updated_at: String,
    body: String,
    user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

async fn create_chirp(
    State(state): State<AppState>,
    Auth(user_id): Auth,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = validate_chirp(&payload.body)?;

    let chirp = state
        .db
        .chirps()
        .create(user_id, &body)
        .await
        .db_err("Failed to create chirp")?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_uuid(raw, "author ID")?),
    };

    let mut chirps = match author_id {
        Some(author_id) => state
            .db
            .chirps()
            .list_by_author(author_id)
            .await
            .db_err("Failed to fetch chirps by author")?,
        None => state
            .db
            .chirps()
            .list()
            .await
            .db_err("Failed to fetch chirps")?,
    };

    sort_chirps(&mut chirps, SortDirection::from_param(query.sort.as_deref()));

    Ok(Json(
        chirps
            .into_iter()
            .map(ChirpResponse::from)
            .collect::<Vec<_>>(),
    ))
}

async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp_id = parse_uuid(&chirp_id, "chirp ID")?;

    let chirp = state
        .db
        .chirps()
        .get_by_id(chirp_id)
        .await
        .db_err("Failed to fetch chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let chirp_id = parse_uuid(&chirp_id, "chirp ID")?;

    let chirp = state
        .db
        .chirps()
        .get_by_id(chirp_id)
        .await
        .db_err("Failed to fetch chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    let user_id = require_owner(&headers, &state.jwt, chirp.user_id)?;

    let deleted = state
        .db
        .chirps()
        .delete(chirp.id)
        .await
        .db_err("Failed to delete chirp")?;

    if !deleted {
        return Err(ApiError::not_found("Chirp not found"));
    }

    info!(%user_id, chirp_id = %chirp.id, "Chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chirp(created_at: &str, body: &str) -> Chirp {
        Chirp {
            id: Uuid::new_v4(),
            body: body.into(),
            user_id: Uuid::nil(),
            created_at: created_at.into(),
            updated_at: created_at.into(),
        }
    }

    fn bodies(chirps: &[Chirp]) -> Vec<&str> {
        chirps.iter().map(|c| c.body.as_str()).collect()
    }

    #[test]
    fn test_clean_body_replaces_banned_words() {
        assert_eq!(
            clean_body("This is a kerfuffle opinion I need to share with the world"),
            "This is a **** opinion I need to share with the world"
        );
        assert_eq!(clean_body("Sharbert and FORNAX"), "**** and ****");
    }

    #[test]
    fn test_clean_body_keeps_punctuated_words() {
        assert_eq!(clean_body("what a kerfuffle!"), "what a kerfuffle!");
        assert_eq!(clean_body("double  space"), "double  space");
    }

    #[test]
    fn test_validate_chirp_length() {
        let limit = "a".repeat(MAX_CHIRP_LENGTH);
        assert_eq!(validate_chirp(&limit).unwrap(), limit);

        let too_long = "a".repeat(MAX_CHIRP_LENGTH + 1);
        assert!(matches!(
            validate_chirp(&too_long),
            Err(ApiError::BadRequest(m)) if m == "Chirp is too long"
        ));
    }

    #[test]
    fn test_validate_chirp_counts_characters() {
        let accented = "é".repeat(MAX_CHIRP_LENGTH);
        assert!(validate_chirp(&accented).is_ok());
    }

    #[test]
    fn test_sort_direction_param() {
        assert_eq!(SortDirection::from_param(None), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("bogus")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("desc")), SortDirection::Desc);
    }

    #[test]
    fn test_sort_chirps_is_stable() {
        let mut chirps = vec![
            chirp("2025-01-02T00:00:00.000Z", "b1"),
            chirp("2025-01-01T00:00:00.000Z", "a"),
            chirp("2025-01-02T00:00:00.000Z", "b2"),
            chirp("2025-01-03T00:00:00.000Z", "c"),
        ];

        sort_chirps(&mut chirps, SortDirection::Asc);
        assert_eq!(bodies(&chirps), vec!["a", "b1", "b2", "c"]);

        sort_chirps(&mut chirps, SortDirection::Desc);
        assert_eq!(bodies(&chirps), vec!["c", "b1", "b2", "a"]);
    }
}
