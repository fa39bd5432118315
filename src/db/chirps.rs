//! Chirp storage.

use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::parse_uuid;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: String,
    body: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChirpRow> for Chirp {
    type Error = sqlx::Error;

    fn try_from(row: ChirpRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            body: row.body,
            user_id: parse_uuid(&row.user_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn collect(rows: Vec<ChirpRow>) -> Result<Vec<Chirp>, sqlx::Error> {
    rows.into_iter().map(Chirp::try_from).collect()
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a chirp owned by `user_id`. The body must already be validated.
    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, sqlx::Error> {
        let row: ChirpRow = sqlx::query_as(
            "INSERT INTO chirps (id, body, user_id) VALUES (?, ?, ?)
             RETURNING id, body, user_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(body)
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    /// All chirps in insertion order.
    pub async fn list(&self) -> Result<Vec<Chirp>, sqlx::Error> {
        let rows: Vec<ChirpRow> = sqlx::query_as(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    /// One author's chirps in insertion order.
    pub async fn list_by_author(&self, user_id: Uuid) -> Result<Vec<Chirp>, sqlx::Error> {
        let rows: Vec<ChirpRow> = sqlx::query_as(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps
             WHERE user_id = ? ORDER BY rowid",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> = sqlx::query_as(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Chirp::try_from).transpose()
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
