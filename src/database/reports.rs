use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::similarity_report::{ExternalMatch, SimilarityReport, SourceMatch};

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub owner_id: Option<String>,
    pub context_id: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, report: &SimilarityReport) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<SimilarityReport>>;
    /// Newest first.
    async fn list(&self, filter: ReportFilter) -> Result<Vec<SimilarityReport>>;
}

#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ReportRow {
    id: Uuid,
    owner_id: String,
    context_id: String,
    plagiarism_detected: bool,
    similarity_score: f64,
    matched_sources: Json<Vec<SourceMatch>>,
    external_matches: Json<Vec<ExternalMatch>>,
    summary: String,
    submission_text: String,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for SimilarityReport {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            context_id: row.context_id,
            created_at: row.created_at,
            plagiarism_detected: row.plagiarism_detected,
            similarity_score: row.similarity_score,
            matched_sources: row.matched_sources.0,
            external_matches: row.external_matches.0,
            summary: row.summary,
            submission_text: row.submission_text,
        }
    }
}

const REPORT_COLUMNS: &str = "id, owner_id, context_id, plagiarism_detected, similarity_score, \
    matched_sources, external_matches, summary, submission_text, created_at";

#[async_trait]
impl ReportStore for PgReportStore {
    async fn save(&self, report: &SimilarityReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO similarity_reports (
                id, owner_id, context_id, plagiarism_detected, similarity_score,
                matched_sources, external_matches, summary, submission_text, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(report.id)
        .bind(&report.owner_id)
        .bind(&report.context_id)
        .bind(report.plagiarism_detected)
        .bind(report.similarity_score)
        .bind(Json(report.matched_sources.clone()))
        .bind(Json(report.external_matches.clone()))
        .bind(&report.summary)
        .bind(&report.submission_text)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SimilarityReport>> {
        let sql = format!("SELECT {} FROM similarity_reports WHERE id = $1", REPORT_COLUMNS);
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SimilarityReport::from))
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<SimilarityReport>> {
        let sql = format!(
            r#"SELECT {} FROM similarity_reports
               WHERE ($1::TEXT IS NULL OR owner_id = $1)
                 AND ($2::TEXT IS NULL OR context_id = $2)
               ORDER BY created_at DESC"#,
            REPORT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(filter.owner_id)
            .bind(filter.context_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SimilarityReport::from).collect())
    }
}
