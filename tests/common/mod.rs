#![allow(dead_code)]

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

use edumate_backend::{
    database::{
        attempts::AttemptStore,
        corpus::CorpusStore,
        quizzes::{QuizFilter, QuizStore},
        reports::{ReportFilter, ReportStore},
        Stores,
    },
    error::{Error, Result},
    models::{
        quiz::{NewQuiz, Quiz},
        quiz_attempt::QuizAttempt,
        similarity_report::{ExternalMatch, SimilarityReport},
        submission::SubmissionRecord,
    },
    services::{ai_service::TextGenerator, search_service::SearchProvider},
    AppState,
};

#[derive(Default)]
pub struct MemoryCorpus(pub Mutex<Vec<SubmissionRecord>>);

#[async_trait]
impl CorpusStore for MemoryCorpus {
    async fn load_all(&self) -> Result<Vec<SubmissionRecord>> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn append(&self, record: &SubmissionRecord) -> Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryReports(Mutex<Vec<SimilarityReport>>);

#[async_trait]
impl ReportStore for MemoryReports {
    async fn save(&self, report: &SimilarityReport) -> Result<()> {
        self.0.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SimilarityReport>> {
        Ok(self.0.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<SimilarityReport>> {
        let mut reports: Vec<_> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.owner_id.as_ref().map_or(true, |o| &r.owner_id == o))
            .filter(|r| filter.context_id.as_ref().map_or(true, |c| &r.context_id == c))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }
}

#[derive(Default)]
pub struct MemoryQuizzes(Mutex<HashMap<String, Quiz>>);

#[async_trait]
impl QuizStore for MemoryQuizzes {
    async fn insert(&self, quiz: NewQuiz) -> Result<Quiz> {
        let now = Utc::now();
        let stored = Quiz {
            id: Uuid::new_v4().to_string(),
            course_id: quiz.course_id,
            title: quiz.title,
            subject: quiz.subject,
            topic: quiz.topic,
            difficulty: quiz.difficulty,
            description: quiz.description,
            passing_score: quiz.passing_score,
            questions: quiz.questions,
            created_by: quiz.created_by,
            created_at: now,
            updated_at: now,
        };
        self.0
            .lock()
            .unwrap()
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<Option<Quiz>> {
        Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, filter: QuizFilter) -> Result<Vec<Quiz>> {
        let mut quizzes: Vec<_> = self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|q| filter.course_id.is_none() || q.course_id == filter.course_id)
            .filter(|q| match (&filter.subject, &q.subject) {
                (None, _) => true,
                (Some(wanted), Some(subject)) => wanted.eq_ignore_ascii_case(subject),
                (Some(_), None) => false,
            })
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(quizzes)
    }

    async fn update(&self, mut quiz: Quiz) -> Result<Option<Quiz>> {
        let mut quizzes = self.0.lock().unwrap();
        if !quizzes.contains_key(&quiz.id) {
            return Ok(None);
        }
        quiz.updated_at = Utc::now();
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(Some(quiz))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().remove(id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryAttempts(Mutex<Vec<QuizAttempt>>);

#[async_trait]
impl AttemptStore for MemoryAttempts {
    async fn record(&self, attempt: &QuizAttempt) -> Result<()> {
        self.0.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn for_student(&self, student_id: &str) -> Result<Vec<QuizAttempt>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}

/// Text generator that is always down.
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Collaborator("generator offline".to_string()))
    }
}

/// Search provider that reports every chunk as found on one page.
pub struct EchoSearch {
    pub score: f64,
}

#[async_trait]
impl SearchProvider for EchoSearch {
    async fn search(&self, chunk: &str) -> Result<Option<ExternalMatch>> {
        Ok(Some(ExternalMatch {
            source_id: "https://example.org/source".to_string(),
            source_title: "Example source".to_string(),
            matched_text: chunk.to_string(),
            similarity_score: self.score,
        }))
    }
}

pub struct TestApp {
    pub router: Router,
    pub corpus: Arc<MemoryCorpus>,
}

pub fn init_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://unused@localhost/unused");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("SIMILARITY_THRESHOLD", "0.8");
    // every test in a binary shares the one config
    let _ = edumate_backend::config::init_config();
}

pub fn test_app(search: Option<Arc<dyn SearchProvider>>) -> TestApp {
    init_env();
    let corpus = Arc::new(MemoryCorpus::default());
    let stores = Stores {
        corpus: corpus.clone(),
        reports: Arc::new(MemoryReports::default()),
        quizzes: Arc::new(MemoryQuizzes::default()),
        attempts: Arc::new(MemoryAttempts::default()),
    };
    let state = AppState::from_parts(stores, Arc::new(OfflineGenerator), search, 10);
    TestApp {
        router: edumate_backend::routes::build_router(state, 1000),
        corpus,
    }
}

pub fn token(user_id: &str, role: &str) -> String {
    edumate_backend::middleware::auth::issue_token(user_id, Some(role), 3600)
        .expect("sign token")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}
