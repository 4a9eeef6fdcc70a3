use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::question::{answers_match, Question, QuestionType};
use crate::models::quiz::{NewQuiz, DEFAULT_PASSING_SCORE};

/// Hosted text-generation model: prompt in, free text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            role: &'a str,
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            max_output_tokens: u32,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespCandidate {
            content: Option<RespContent>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<RespCandidate>,
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::Collaborator(
                "text generation is not configured".to_string(),
            ));
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let req = Req {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        };

        let res = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Collaborator(format!(
                "Gemini status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body: Resp = res.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Collaborator("Gemini returned no text".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizGenerationRequest {
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub num_questions: usize,
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub quiz: NewQuiz,
    pub ai_generated: bool,
    pub logs: Vec<String>,
}

#[derive(Clone)]
pub struct AIService {
    generator: Arc<dyn TextGenerator>,
    max_questions: usize,
}

impl AIService {
    pub fn new(generator: Arc<dyn TextGenerator>, max_questions: usize) -> Self {
        Self {
            generator,
            max_questions: max_questions.max(1),
        }
    }

    /// Drafts a quiz with the text generator, or a template quiz when that fails.
    pub async fn generate_quiz(&self, req: &QuizGenerationRequest) -> GenerationOutput {
        let num_questions = req.num_questions.clamp(1, self.max_questions);
        let mut logs = vec![format!(
            "Requesting {} questions on {} / {} ({}).",
            num_questions, req.subject, req.topic, req.difficulty
        )];

        let prompt = quiz_prompt(&req.subject, &req.topic, &req.difficulty, num_questions);
        let failure = match self.generator.generate(&prompt).await {
            Ok(text) => {
                logs.push("Response received. Parsing and sanitizing...".to_string());
                match serde_json::from_str::<JsonValue>(strip_code_fence(&text)) {
                    Ok(raw) => {
                        let questions = self.sanitize_questions(&raw, num_questions);
                        if questions.is_empty() {
                            "no usable questions in the response".to_string()
                        } else {
                            logs.push(format!("Finalized {} questions.", questions.len()));
                            let title = raw
                                .get("title")
                                .and_then(|v| v.as_str())
                                .map(str::trim)
                                .filter(|t| !t.is_empty())
                                .map(str::to_string)
                                .unwrap_or_else(|| format!("{} Quiz", req.topic));
                            return GenerationOutput {
                                quiz: NewQuiz {
                                    course_id: req.course_id.clone(),
                                    title,
                                    subject: Some(req.subject.clone()),
                                    topic: Some(req.topic.clone()),
                                    difficulty: Some(req.difficulty.clone()),
                                    description: None,
                                    passing_score: DEFAULT_PASSING_SCORE,
                                    questions,
                                    created_by: Some("AI".to_string()),
                                },
                                ai_generated: true,
                                logs,
                            };
                        }
                    }
                    Err(e) => format!("response was not valid JSON: {}", e),
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(reason = %failure, "AI quiz generation failed, using template");
        logs.push(format!(
            "AI generation failed, using template instead: {}",
            failure
        ));
        GenerationOutput {
            quiz: fallback_quiz(req, num_questions),
            ai_generated: false,
            logs,
        }
    }

    pub fn sanitize_questions(&self, raw: &JsonValue, num_questions: usize) -> Vec<Question> {
        let items = if let Some(arr) = raw.get("questions").and_then(|a| a.as_array()) {
            arr.clone()
        } else if let Some(arr) = raw.as_array() {
            arr.clone()
        } else {
            vec![]
        };

        let mut rng = rand::thread_rng();
        let mut questions: Vec<Question> = items
            .iter()
            .filter_map(|v| coerce_question(v, &mut rng))
            .collect();
        questions.truncate(num_questions);
        questions
    }
}

fn coerce_question(v: &JsonValue, rng: &mut impl rand::Rng) -> Option<Question> {
    let question_type = QuestionType::parse(v.get("type").and_then(|s| s.as_str())?)?;
    let text = v.get("question").and_then(|s| s.as_str())?.trim().to_string();
    if text.is_empty() {
        return None;
    }
    let mut correct_answer = match v.get("correct_answer") {
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Bool(true)) => "True".to_string(),
        Some(JsonValue::Bool(false)) => "False".to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let explanation = v
        .get("explanation")
        .and_then(|s| s.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let mut options: Vec<String> = v
        .get("options")
        .and_then(|o| o.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|x| x.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    match question_type {
        QuestionType::TrueFalse => {
            options = vec!["True".to_string(), "False".to_string()];
            if !options.iter().any(|o| answers_match(o, &correct_answer)) {
                return None;
            }
        }
        QuestionType::MultipleChoice => {
            if options.len() < 2 {
                return None;
            }
            if !options.iter().any(|o| answers_match(o, &correct_answer)) {
                correct_answer = options[0].clone();
            }
            options.shuffle(rng);
        }
        QuestionType::ShortAnswer | QuestionType::FillBlank => {
            options.clear();
            if correct_answer.is_empty() {
                return None;
            }
        }
    }

    Some(Question {
        question_type,
        question: text,
        options,
        correct_answer,
        explanation,
        points: 1,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + "```json".len()..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    trimmed
}

fn quiz_prompt(subject: &str, topic: &str, difficulty: &str, num_questions: usize) -> String {
    format!(
        r#"Create a detailed quiz on {subject} focusing on {topic}.
Difficulty level: {difficulty}.
Total questions: {num_questions}.

Return only a JSON object with this shape:
{{
    "title": "<quiz title>",
    "questions": [
        {{
            "question": "<question text>",
            "type": "multiple_choice | true_false | short_answer | fill_blank",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "correct_answer": "<correct answer>",
            "explanation": "<why the answer is correct>"
        }}
    ]
}}

For multiple choice questions provide 4 options and make correct_answer the exact text of one option.
For true/false questions set options to ["True", "False"].
Omit options for short answer and fill in the blank questions.
Every question needs an explanation of the correct answer."#
    )
}

fn fallback_quiz(req: &QuizGenerationRequest, num_questions: usize) -> NewQuiz {
    let topic = &req.topic;
    let questions = (0..num_questions)
        .map(|i| {
            let n = i + 1;
            match i % 4 {
                0 => Question {
                    question_type: QuestionType::MultipleChoice,
                    question: format!("Sample question {} about {}?", n, topic),
                    options: ["Option A", "Option B", "Option C", "Option D"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    correct_answer: "Option A".to_string(),
                    explanation: Some(format!(
                        "This is an explanation of the correct answer for question {}.",
                        n
                    )),
                    points: 1,
                },
                1 => Question {
                    question_type: QuestionType::TrueFalse,
                    question: format!("Sample true/false statement {} about {}.", n, topic),
                    options: vec!["True".to_string(), "False".to_string()],
                    correct_answer: "True".to_string(),
                    explanation: Some(format!(
                        "This is an explanation of why the statement {} is true.",
                        n
                    )),
                    points: 1,
                },
                2 => Question {
                    question_type: QuestionType::ShortAnswer,
                    question: format!(
                        "Explain briefly the concept of {} related to question {}.",
                        topic, n
                    ),
                    options: vec![],
                    correct_answer: format!("A brief explanation of {} for question {}.", topic, n),
                    explanation: Some(format!(
                        "This is a more detailed explanation for short answer question {}.",
                        n
                    )),
                    points: 1,
                },
                _ => Question {
                    question_type: QuestionType::FillBlank,
                    question: format!(
                        "The process of _____ is essential to understanding {}.",
                        topic
                    ),
                    options: vec![],
                    correct_answer: topic.clone(),
                    explanation: Some(format!(
                        "This is an explanation of why {} fills the blank correctly.",
                        topic
                    )),
                    points: 1,
                },
            }
        })
        .collect();

    NewQuiz {
        course_id: req.course_id.clone(),
        title: format!("{} Quiz", topic),
        subject: Some(req.subject.clone()),
        topic: Some(req.topic.clone()),
        difficulty: Some(req.difficulty.clone()),
        description: Some("AI generation failed, using template instead".to_string()),
        passing_score: DEFAULT_PASSING_SCORE,
        questions,
        created_by: Some("AI".to_string()),
    }
}
