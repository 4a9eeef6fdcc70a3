use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::question::Question;
use crate::models::quiz::{NewQuiz, Quiz};

/// Both fields are optional; `subject` compares case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct QuizFilter {
    pub course_id: Option<String>,
    pub subject: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert(&self, quiz: NewQuiz) -> Result<Quiz>;
    async fn get(&self, id: &str) -> Result<Option<Quiz>>;
    /// Oldest first.
    async fn list(&self, filter: QuizFilter) -> Result<Vec<Quiz>>;
    /// Replaces the content of an existing quiz; `None` when the id is unknown.
    async fn update(&self, quiz: Quiz) -> Result<Option<Quiz>>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct QuizRow {
    id: String,
    course_id: Option<String>,
    title: String,
    subject: Option<String>,
    topic: Option<String>,
    difficulty: Option<String>,
    description: Option<String>,
    passing_score: f64,
    questions: Json<Vec<Question>>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            subject: row.subject,
            topic: row.topic,
            difficulty: row.difficulty,
            description: row.description,
            passing_score: row.passing_score,
            questions: row.questions.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const QUIZ_COLUMNS: &str = "id, course_id, title, subject, topic, difficulty, description, \
    passing_score, questions, created_by, created_at, updated_at";

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn insert(&self, quiz: NewQuiz) -> Result<Quiz> {
        let sql = format!(
            r#"
            INSERT INTO quizzes (
                id, course_id, title, subject, topic, difficulty, description,
                passing_score, questions, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            QUIZ_COLUMNS
        );
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(quiz.course_id)
            .bind(quiz.title)
            .bind(quiz.subject)
            .bind(quiz.topic)
            .bind(quiz.difficulty)
            .bind(quiz.description)
            .bind(quiz.passing_score)
            .bind(Json(quiz.questions))
            .bind(quiz.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get(&self, id: &str) -> Result<Option<Quiz>> {
        let sql = format!("SELECT {} FROM quizzes WHERE id = $1", QUIZ_COLUMNS);
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Quiz::from))
    }

    async fn list(&self, filter: QuizFilter) -> Result<Vec<Quiz>> {
        let sql = format!(
            r#"
            SELECT {} FROM quizzes
            WHERE ($1::TEXT IS NULL OR course_id = $1)
              AND ($2::TEXT IS NULL OR LOWER(subject) = LOWER($2))
            ORDER BY created_at ASC
            "#,
            QUIZ_COLUMNS
        );
        let rows = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(filter.course_id)
            .bind(filter.subject)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Quiz::from).collect())
    }

    async fn update(&self, quiz: Quiz) -> Result<Option<Quiz>> {
        let sql = format!(
            r#"
            UPDATE quizzes
            SET title = $2, subject = $3, topic = $4, difficulty = $5, description = $6,
                passing_score = $7, questions = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            QUIZ_COLUMNS
        );
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(quiz.id)
            .bind(quiz.title)
            .bind(quiz.subject)
            .bind(quiz.topic)
            .bind(quiz.difficulty)
            .bind(quiz.description)
            .bind(quiz.passing_score)
            .bind(Json(quiz.questions))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Quiz::from))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
