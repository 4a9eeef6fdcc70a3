use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckSimilarityRequest {
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(length(min = 1))]
    pub context_id: String,
    /// Only honoured for instructors; students always check as themselves.
    pub owner_id: Option<String>,
    #[serde(default = "default_check_external")]
    pub check_external: bool,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub threshold: Option<f64>,
}

fn default_check_external() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub owner_id: Option<String>,
    pub context_id: Option<String>,
}
