use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const QUIZ_NOT_FOUND: &str = "Quiz not found";

/// Answers keyed by question index. Missing indices read as the empty answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub answers: BTreeMap<usize, String>,
}

impl QuizSubmission {
    pub fn answer_for(&self, index: usize) -> &str {
        self.answers.get(&index).map(String::as_str).unwrap_or("")
    }

    /// Same answers with an explicit empty string for every unanswered question.
    pub fn normalized(&self, question_count: usize) -> BTreeMap<usize, String> {
        (0..question_count)
            .map(|i| (i, self.answer_for(i).to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_index: usize,
    pub is_correct: bool,
    pub student_answer: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub quiz_id: String,
    /// Number of correct answers.
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub passed: bool,
    pub question_results: Vec<QuestionOutcome>,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GradingResult {
    pub fn quiz_not_found(quiz_id: &str) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            score: 0,
            total: 0,
            percentage: 0.0,
            passed: false,
            question_results: Vec::new(),
            feedback: format!("Error: {}", QUIZ_NOT_FOUND),
            error: Some(QUIZ_NOT_FOUND.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error.as_deref() == Some(QUIZ_NOT_FOUND)
    }
}
