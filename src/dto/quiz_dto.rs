use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::grading::GradingResult;
use crate::models::question::Question;
use crate::models::quiz_attempt::QuizAttempt;

/// Body of both quiz create and full-replace update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: Option<f64>,
    #[validate(length(min = 1))]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizListQuery {
    pub course_id: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuizResponse {
    #[serde(flatten)]
    pub result: GradingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<QuizAttempt>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateQuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 100))]
    pub num_questions: usize,
    pub course_id: Option<String>,
    /// Store the generated quiz right away instead of only returning it.
    #[serde(default)]
    pub save: bool,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_num_questions() -> usize {
    5
}
