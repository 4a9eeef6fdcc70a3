use std::sync::Arc;

use crate::models::grading::{GradingResult, QuestionOutcome, QuizSubmission};
use crate::models::question::{answers_match, Question, QuestionType};
use crate::models::quiz::Quiz;
use crate::services::ai_service::TextGenerator;

#[derive(Clone)]
pub struct GradingService {
    generator: Arc<dyn TextGenerator>,
}

impl GradingService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Grades every question in order and attaches a feedback narrative.
    ///
    /// Collaborator failures never surface here: short answers fall back to
    /// keyword matching and feedback to a templated sentence.
    pub async fn grade(&self, quiz: &Quiz, submission: &QuizSubmission) -> GradingResult {
        let mut outcomes = Vec::with_capacity(quiz.questions.len());
        for (index, question) in quiz.questions.iter().enumerate() {
            let answer = submission.answer_for(index);
            let is_correct = match question.question_type {
                QuestionType::ShortAnswer => self.judge_short_answer(question, answer).await,
                _ => answers_match(answer, &question.correct_answer),
            };
            outcomes.push(QuestionOutcome {
                question_index: index,
                is_correct,
                student_answer: answer.to_string(),
                correct_answer: question.correct_answer.clone(),
                explanation: question.explanation.clone(),
            });
        }

        let total = outcomes.len();
        let score = outcomes.iter().filter(|o| o.is_correct).count();
        let percentage = if total == 0 {
            0.0
        } else {
            score as f64 / total as f64 * 100.0
        };
        let feedback = self.feedback(quiz, &outcomes, score, percentage).await;

        GradingResult {
            quiz_id: quiz.id.clone(),
            score,
            total,
            percentage,
            passed: percentage >= quiz.passing_score,
            question_results: outcomes,
            feedback,
            error: None,
        }
    }

    async fn judge_short_answer(&self, question: &Question, answer: &str) -> bool {
        if answer.trim().is_empty() {
            return false;
        }

        let prompt = format!(
            "Evaluate if the student's answer correctly addresses the question.\n\n\
             Question: {}\n\
             Expected answer key points: {}\n\
             Student answer: {}\n\n\
             Determine if the student's answer adequately addresses the key points expected in the answer. \
             The student doesn't need to use the exact same words, but should demonstrate understanding of the core concepts.\n\n\
             Respond with either \"CORRECT\" or \"INCORRECT\" followed by a brief explanation.",
            question.question, question.correct_answer, answer
        );

        match self.generator.generate(&prompt).await {
            Ok(verdict) => verdict.trim().to_uppercase().starts_with("CORRECT"),
            Err(e) => {
                tracing::warn!(error = %e, "short answer judgment unavailable, using keyword match");
                keyword_fallback(answer, &question.correct_answer)
            }
        }
    }

    async fn feedback(
        &self,
        quiz: &Quiz,
        outcomes: &[QuestionOutcome],
        score: usize,
        percentage: f64,
    ) -> String {
        let prompt = feedback_prompt(quiz, outcomes, score, percentage);
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(quiz_id = %quiz.id, "empty feedback from generator, using template");
                fallback_feedback(percentage)
            }
            Err(e) => {
                tracing::warn!(quiz_id = %quiz.id, error = %e, "feedback generation failed, using template");
                fallback_feedback(percentage)
            }
        }
    }
}

/// True when any word of the canonical answer longer than 3 characters shows
/// up, case-insensitively, inside the student's answer.
pub fn keyword_fallback(answer: &str, expected: &str) -> bool {
    let answer = answer.to_lowercase();
    expected
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .any(|word| answer.contains(&word.to_lowercase()))
}

pub fn fallback_feedback(percentage: f64) -> String {
    if percentage >= 80.0 {
        format!(
            "Great job! You scored {:.1}% on the quiz. Keep up the good work!",
            percentage
        )
    } else if percentage >= 60.0 {
        format!(
            "Good effort! You scored {:.1}% on the quiz. Review the questions you missed to improve.",
            percentage
        )
    } else {
        format!(
            "You scored {:.1}% on the quiz. Consider revisiting the material and trying again.",
            percentage
        )
    }
}

fn feedback_prompt(quiz: &Quiz, outcomes: &[QuestionOutcome], score: usize, percentage: f64) -> String {
    let topic = quiz.topic.as_deref().unwrap_or("");
    let details: Vec<String> = outcomes
        .iter()
        .zip(&quiz.questions)
        .map(|(o, q)| {
            let mut line = format!(
                "Q{}: '{}' - {}",
                o.question_index + 1,
                q.question,
                if o.is_correct { "Correct" } else { "Incorrect" }
            );
            if !o.is_correct {
                line.push_str(&format!(
                    " (You answered: '{}', Correct answer: '{}')",
                    o.student_answer, o.correct_answer
                ));
            }
            line
        })
        .collect();

    format!(
        "Generate personalized feedback for a student's quiz performance.\n\n\
         Quiz: {title} on {topic}\n\
         Score: {score}/{total} ({percentage:.1}%)\n\n\
         Question performance:\n{details}\n\n\
         Please provide:\n\
         1. An encouraging opening statement about their performance\n\
         2. Identify 2-3 areas they did well in\n\
         3. Identify 2-3 areas for improvement, focusing on questions they got wrong\n\
         4. Suggest specific ways they can improve their understanding of {topic}\n\
         5. End with an encouraging statement\n\n\
         Keep the tone positive and constructive. Format the response in markdown.",
        title = quiz.title,
        topic = topic,
        score = score,
        total = outcomes.len(),
        percentage = percentage,
        details = details.join("\n"),
    )
}
