use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::sequence::SentencePair;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub id: Uuid,
    pub owner_id: String,
    pub context_id: String,
    pub created_at: DateTime<Utc>,
    pub plagiarism_detected: bool,
    /// Highest score among all local and external matches, 0 when clean.
    pub similarity_score: f64,
    pub matched_sources: Vec<SourceMatch>,
    pub external_matches: Vec<ExternalMatch>,
    pub summary: String,
    pub submission_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMatch {
    pub submission_id: Uuid,
    pub owner_id: String,
    pub context_id: String,
    pub similarity_score: f64,
    pub matching_sentences: Vec<SentencePair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalMatch {
    pub source_id: String,
    pub source_title: String,
    pub matched_text: String,
    pub similarity_score: f64,
}
