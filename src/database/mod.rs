pub mod attempts;
pub mod corpus;
pub mod pool;
pub mod quizzes;
pub mod reports;

use std::sync::Arc;

use sqlx::PgPool;

use self::{
    attempts::{AttemptStore, PgAttemptStore},
    corpus::{CorpusStore, PgCorpusStore},
    quizzes::{PgQuizStore, QuizStore},
    reports::{PgReportStore, ReportStore},
};

/// The repositories the services are built on.
#[derive(Clone)]
pub struct Stores {
    pub corpus: Arc<dyn CorpusStore>,
    pub reports: Arc<dyn ReportStore>,
    pub quizzes: Arc<dyn QuizStore>,
    pub attempts: Arc<dyn AttemptStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            corpus: Arc::new(PgCorpusStore::new(pool.clone())),
            reports: Arc::new(PgReportStore::new(pool.clone())),
            quizzes: Arc::new(PgQuizStore::new(pool.clone())),
            attempts: Arc::new(PgAttemptStore::new(pool)),
        }
    }
}
