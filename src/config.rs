use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base_url: String,
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    /// Default plagiarism threshold when a check request omits one.
    pub similarity_threshold: f64,
    pub max_generated_questions: usize,
    pub ai_timeout_secs: u64,
    /// Requests per second admitted to the similarity check endpoint.
    pub similarity_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let similarity_threshold: f64 = get_env_parse_or("SIMILARITY_THRESHOLD", 0.8)?;
        if !(similarity_threshold > 0.0 && similarity_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "SIMILARITY_THRESHOLD must be in (0, 1], got {}",
                similarity_threshold
            )));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_opt("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            gemini_api_base_url: get_env_opt("GEMINI_API_BASE_URL").unwrap_or_else(|| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            google_search_api_key: get_env_opt("GOOGLE_SEARCH_API_KEY"),
            google_search_engine_id: get_env_opt("GOOGLE_SEARCH_ENGINE_ID"),
            similarity_threshold,
            max_generated_questions: get_env_parse_or("MAX_GENERATED_QUESTIONS", 20)?,
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 60)?,
            similarity_rps: get_env_parse_or("SIMILARITY_RPS", 10)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
