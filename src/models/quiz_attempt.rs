use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub student_id: String,
    pub quiz_id: String,
    /// Percentage, 0-100.
    pub score: f64,
    pub correct_count: i32,
    pub total_count: i32,
    pub answers: BTreeMap<usize, String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub attempts: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub passing_rate: f64,
}
