use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::Question;

pub const DEFAULT_PASSING_SCORE: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub passing_score: f64,
    pub questions: Vec<Question>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn student_view(&self) -> Quiz {
        Quiz {
            questions: self.questions.iter().map(Question::without_answer).collect(),
            ..self.clone()
        }
    }
}

/// Quiz content before it has an identity in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuiz {
    pub course_id: Option<String>,
    pub title: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub passing_score: f64,
    pub questions: Vec<Question>,
    pub created_by: Option<String>,
}
