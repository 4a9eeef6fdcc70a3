use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillBlank,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::FillBlank => "fill_blank",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "true_false" => Some(QuestionType::TrueFalse),
            "short_answer" => Some(QuestionType::ShortAnswer),
            "fill_blank" => Some(QuestionType::FillBlank),
            _ => None,
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }
}

impl Question {
    /// Fills in the implicit option set of a true/false question.
    pub fn normalize(&mut self) {
        if self.question_type == QuestionType::TrueFalse && self.options.is_empty() {
            self.options = vec!["True".to_string(), "False".to_string()];
        }
        if !self.question_type.has_options() {
            self.options.clear();
        }
        self.points = self.points.max(0);
    }

    /// Checks that a choice question's answer key is one of its options.
    pub fn check_answer_key(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text must not be empty".to_string());
        }
        if self.question_type.has_options() {
            if self.options.len() < 2 {
                return Err(format!(
                    "{} question needs at least two options",
                    self.question_type.as_str()
                ));
            }
            if !self.options.iter().any(|o| answers_match(o, &self.correct_answer)) {
                return Err(format!(
                    "correct answer '{}' is not one of the options",
                    self.correct_answer
                ));
            }
        } else if self.correct_answer.trim().is_empty() {
            return Err("correct answer must not be empty".to_string());
        }
        Ok(())
    }

    /// Copy safe to show an examinee: answer key and explanation removed.
    pub fn without_answer(&self) -> Question {
        Question {
            correct_answer: String::new(),
            explanation: None,
            ..self.clone()
        }
    }
}

/// Case-insensitive comparison used for every exact-match question type.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}
