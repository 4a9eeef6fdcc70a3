use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One text in the plagiarism corpus. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub context_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(owner_id: &str, context_id: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            context_id: context_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }
}
