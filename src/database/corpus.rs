use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::submission::SubmissionRecord;

/// Append-only collection of previously checked texts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CorpusStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<SubmissionRecord>>;
    async fn append(&self, record: &SubmissionRecord) -> Result<()>;
}

#[derive(Clone)]
pub struct PgCorpusStore {
    pool: PgPool,
}

impl PgCorpusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SubmissionRow {
    id: Uuid,
    owner_id: String,
    context_id: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<SubmissionRow> for SubmissionRecord {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            context_id: row.context_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CorpusStore for PgCorpusStore {
    async fn load_all(&self) -> Result<Vec<SubmissionRecord>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"SELECT id, owner_id, context_id, text, created_at FROM submissions ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SubmissionRecord::from).collect())
    }

    async fn append(&self, record: &SubmissionRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO submissions (id, owner_id, context_id, text, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(record.id)
        .bind(&record.owner_id)
        .bind(&record.context_id)
        .bind(&record.text)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
