use std::sync::Arc;

use crate::database::quizzes::{QuizFilter, QuizStore};
use crate::dto::quiz_dto::{QuizPayload, SubmitQuizResponse};
use crate::error::{Error, Result};
use crate::models::grading::{GradingResult, QuizSubmission};
use crate::models::question::Question;
use crate::models::quiz::{NewQuiz, Quiz, DEFAULT_PASSING_SCORE};
use crate::services::attempt_service::AttemptService;
use crate::services::grading_service::GradingService;

#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizStore>,
    grading: GradingService,
    attempts: AttemptService,
}

impl QuizService {
    pub fn new(quizzes: Arc<dyn QuizStore>, grading: GradingService, attempts: AttemptService) -> Self {
        Self {
            quizzes,
            grading,
            attempts,
        }
    }

    pub async fn create_quiz(
        &self,
        course_id: Option<String>,
        payload: QuizPayload,
        created_by: Option<String>,
    ) -> Result<Quiz> {
        let questions = prepare_questions(payload.questions)?;
        let quiz = self
            .quizzes
            .insert(NewQuiz {
                course_id,
                title: payload.title,
                subject: payload.subject,
                topic: payload.topic,
                difficulty: payload.difficulty,
                description: payload.description,
                passing_score: payload.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
                questions,
                created_by,
            })
            .await?;
        tracing::info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz created");
        Ok(quiz)
    }

    /// Stores a quiz drafted elsewhere (e.g. by the generator) after the same
    /// answer-key checks a hand-written one goes through.
    pub async fn store_quiz(&self, mut quiz: NewQuiz) -> Result<Quiz> {
        quiz.questions = prepare_questions(quiz.questions)?;
        self.quizzes.insert(quiz).await
    }

    pub async fn get_quiz(&self, id: &str) -> Result<Quiz> {
        self.quizzes
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", id)))
    }

    pub async fn list_quizzes(&self, mut filter: QuizFilter) -> Result<Vec<Quiz>> {
        filter.subject = filter
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.quizzes.list(filter).await
    }

    /// Replaces title, metadata and questions. Id, course and creation time stay.
    pub async fn update_quiz(&self, id: &str, payload: QuizPayload) -> Result<Quiz> {
        let existing = self.get_quiz(id).await?;
        let questions = prepare_questions(payload.questions)?;
        let updated = Quiz {
            title: payload.title,
            subject: payload.subject,
            topic: payload.topic,
            difficulty: payload.difficulty,
            description: payload.description,
            passing_score: payload.passing_score.unwrap_or(existing.passing_score),
            questions,
            ..existing
        };
        self.quizzes
            .update(updated)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", id)))
    }

    pub async fn delete_quiz(&self, id: &str) -> Result<()> {
        if self.quizzes.delete(id).await? {
            tracing::info!(quiz_id = %id, "quiz deleted");
            Ok(())
        } else {
            Err(Error::NotFound(format!("Quiz {} not found", id)))
        }
    }

    /// Grades against the stored quiz. An unknown id is not an error here: the
    /// result carries the "Quiz not found" indicator instead.
    pub async fn grade_submission(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
    ) -> Result<GradingResult> {
        match self.quizzes.get(quiz_id).await? {
            Some(quiz) => Ok(self.grading.grade(&quiz, submission).await),
            None => Ok(GradingResult::quiz_not_found(quiz_id)),
        }
    }

    pub async fn submit(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
        examinee: Option<&str>,
    ) -> Result<SubmitQuizResponse> {
        let result = self.grade_submission(quiz_id, submission).await?;
        let attempt = match examinee {
            Some(student_id) if !result.is_not_found() => {
                Some(self.attempts.record(student_id, submission, &result).await?)
            }
            _ => None,
        };
        Ok(SubmitQuizResponse { result, attempt })
    }
}

fn prepare_questions(mut questions: Vec<Question>) -> Result<Vec<Question>> {
    for (i, q) in questions.iter_mut().enumerate() {
        q.normalize();
        q.check_answer_key()
            .map_err(|e| Error::BadRequest(format!("question {}: {}", i + 1, e)))?;
    }
    Ok(questions)
}
