use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Append-only text entry; there is no update or delete path.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Submission {
    pub async fn insert(db: &PgPool, text: &str) -> sqlx::Result<Submission> {
        sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (text)
            VALUES ($1)
            RETURNING id, text, created_at
            "#,
        )
        .bind(text)
        .fetch_one(db)
        .await
    }

    /// Newest first.
    pub async fn list_recent(db: &PgPool, limit: i64) -> sqlx::Result<Vec<Submission>> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, text, created_at
            FROM submissions
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await
    }
}
