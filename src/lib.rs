pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::database::Stores;
use crate::error::{Error, Result};
use crate::services::{
    ai_service::{AIService, GeminiClient, TextGenerator},
    attempt_service::AttemptService,
    grading_service::GradingService,
    quiz_service::QuizService,
    search_service::{GoogleSearchClient, SearchProvider},
    similarity_service::SimilarityService,
};

#[derive(Clone)]
pub struct AppState {
    pub similarity_service: SimilarityService,
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
    pub ai_service: AIService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        let generator = Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_base_url.clone(),
            http_client.clone(),
        ));

        let search: Option<Arc<dyn SearchProvider>> = match (
            &config.google_search_api_key,
            &config.google_search_engine_id,
        ) {
            (Some(key), Some(engine)) => Some(Arc::new(GoogleSearchClient::new(
                key.clone(),
                engine.clone(),
                http_client,
            ))),
            _ => {
                tracing::info!("web search not configured, external plagiarism checks disabled");
                None
            }
        };

        Ok(Self::from_parts(
            Stores::postgres(pool),
            generator,
            search,
            config.max_generated_questions,
        ))
    }

    /// Wires the services over arbitrary storage and collaborators.
    pub fn from_parts(
        stores: Stores,
        generator: Arc<dyn TextGenerator>,
        search: Option<Arc<dyn SearchProvider>>,
        max_generated_questions: usize,
    ) -> Self {
        let attempt_service = AttemptService::new(stores.attempts, stores.quizzes.clone());
        let quiz_service = QuizService::new(
            stores.quizzes,
            GradingService::new(generator.clone()),
            attempt_service.clone(),
        );
        let similarity_service = SimilarityService::new(stores.corpus, stores.reports, search);
        let ai_service = AIService::new(generator, max_generated_questions);

        Self {
            similarity_service,
            quiz_service,
            attempt_service,
            ai_service,
        }
    }
}
