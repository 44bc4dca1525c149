//! Request and response bodies for the gateway routes. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// POST /generate-summary/ request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub job_title: String,
    pub skills: String,
    /// Existing draft to improve. `None`, `null` and `""` all mean "write from scratch".
    #[serde(default)]
    pub current_summary: Option<String>,
}

impl SummaryRequest {
    pub fn draft(&self) -> Option<&str> {
        self.current_summary.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// POST /enhance-description/ request body.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionResponse {
    pub enhanced_description: String,
}

/// POST /analyze-resume/ request body. The resume document is opaque JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisRequest {
    pub resume_data: Value,
}
