use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::attempts::AttemptStore;
use crate::database::quizzes::QuizStore;
use crate::error::Result;
use crate::models::grading::{GradingResult, QuizSubmission};
use crate::models::quiz::DEFAULT_PASSING_SCORE;
use crate::models::quiz_attempt::{QuizAttempt, QuizStatistics};

#[derive(Clone)]
pub struct AttemptService {
    attempts: Arc<dyn AttemptStore>,
    quizzes: Arc<dyn QuizStore>,
}

impl AttemptService {
    pub fn new(attempts: Arc<dyn AttemptStore>, quizzes: Arc<dyn QuizStore>) -> Self {
        Self { attempts, quizzes }
    }

    pub async fn record(
        &self,
        student_id: &str,
        submission: &QuizSubmission,
        result: &GradingResult,
    ) -> Result<QuizAttempt> {
        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            quiz_id: result.quiz_id.clone(),
            score: result.percentage,
            correct_count: result.score as i32,
            total_count: result.total as i32,
            answers: submission.normalized(result.total),
            created_at: Utc::now(),
        };
        self.attempts.record(&attempt).await?;

        tracing::info!(
            attempt_id = %attempt.id,
            student_id = %attempt.student_id,
            quiz_id = %attempt.quiz_id,
            score = attempt.score,
            "quiz attempt recorded"
        );
        Ok(attempt)
    }

    pub async fn student_attempts(&self, student_id: &str) -> Result<Vec<QuizAttempt>> {
        self.attempts.for_student(student_id).await
    }

    /// Aggregates every attempt on a quiz. A deleted quiz still has its log;
    /// pass rates then use the default passing score.
    pub async fn quiz_statistics(&self, quiz_id: &str) -> Result<QuizStatistics> {
        let attempts = self.attempts.for_quiz(quiz_id).await?;
        let passing_score = self
            .quizzes
            .get(quiz_id)
            .await?
            .map(|q| q.passing_score)
            .unwrap_or(DEFAULT_PASSING_SCORE);

        let scores: Vec<f64> = attempts.iter().map(|a| a.score).collect();
        Ok(compute_statistics(&scores, passing_score))
    }
}

pub fn compute_statistics(scores: &[f64], passing_score: f64) -> QuizStatistics {
    if scores.is_empty() {
        return QuizStatistics::default();
    }

    let n = scores.len() as f64;
    let passed = scores.iter().filter(|s| **s >= passing_score).count() as f64;
    QuizStatistics {
        attempts: scores.len(),
        average_score: scores.iter().sum::<f64>() / n,
        highest_score: scores.iter().copied().fold(f64::MIN, f64::max),
        lowest_score: scores.iter().copied().fold(f64::MAX, f64::min),
        passing_rate: passed / n * 100.0,
    }
}
