use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::quiz_attempt::QuizAttempt;

/// Append-only log of graded attempts. Repeated attempts accumulate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn record(&self, attempt: &QuizAttempt) -> Result<()>;
    async fn for_student(&self, student_id: &str) -> Result<Vec<QuizAttempt>>;
    async fn for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>>;
}

#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttemptRow {
    id: Uuid,
    student_id: String,
    quiz_id: String,
    score: f64,
    correct_count: i32,
    total_count: i32,
    answers: Json<BTreeMap<usize, String>>,
    created_at: DateTime<Utc>,
}

impl From<AttemptRow> for QuizAttempt {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            quiz_id: row.quiz_id,
            score: row.score,
            correct_count: row.correct_count,
            total_count: row.total_count,
            answers: row.answers.0,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn record(&self, attempt: &QuizAttempt) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (
                id, student_id, quiz_id, score, correct_count, total_count, answers, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(attempt.id)
        .bind(&attempt.student_id)
        .bind(&attempt.quiz_id)
        .bind(attempt.score)
        .bind(attempt.correct_count)
        .bind(attempt.total_count)
        .bind(Json(attempt.answers.clone()))
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn for_student(&self, student_id: &str) -> Result<Vec<QuizAttempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"SELECT id, student_id, quiz_id, score, correct_count, total_count, answers, created_at
               FROM quiz_attempts WHERE student_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(QuizAttempt::from).collect())
    }

    async fn for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"SELECT id, student_id, quiz_id, score, correct_count, total_count, answers, created_at
               FROM quiz_attempts WHERE quiz_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(QuizAttempt::from).collect())
    }
}
