//! Axum route handlers for the Prompt Gateway.
//!
//! Each handler: parse body → render prompt → one generation call → respond.
//! Failures propagate with `?` into `AppError`, which owns the 500 mapping.

use axum::{extract::State, Json};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::{AppError, JsonBody};
use crate::gateway::models::{
    DescriptionRequest, DescriptionResponse, ResumeAnalysisRequest, SummaryRequest,
    SummaryResponse,
};
use crate::gateway::prompts::{analysis_prompt, description_prompt, summary_prompt};
use crate::llm_client::{strip_json_fences, LlmError, OutputFormat};
use crate::state::AppState;

/// POST /generate-summary/
///
/// Writes (or improves) a 3–4 sentence professional summary.
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    info!(
        job_title = %request.job_title,
        has_draft = request.draft().is_some(),
        "Generating summary"
    );

    let prompt = summary_prompt(&request);
    let summary = state.llm.generate(&prompt, OutputFormat::Text).await?;

    Ok(Json(SummaryResponse { summary }))
}

/// POST /enhance-description/
///
/// Rewrites job-description bullets for the given role.
pub async fn handle_enhance_description(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DescriptionRequest>,
) -> Result<Json<DescriptionResponse>, AppError> {
    info!(role = %request.role, "Enhancing description");

    let prompt = description_prompt(&request);
    let enhanced_description = state.llm.generate(&prompt, OutputFormat::Text).await?;

    Ok(Json(DescriptionResponse {
        enhanced_description,
    }))
}

/// POST /analyze-resume/
///
/// Asks the model for `{"score", "feedback"}` JSON and returns the parsed
/// object as-is. The shape is not validated beyond being a JSON object.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResumeAnalysisRequest>,
) -> Result<Json<Map<String, Value>>, AppError> {
    if request.resume_data.is_null() {
        return Err(AppError::InvalidRequest(
            "resumeData is required".to_string(),
        ));
    }

    info!("Analyzing resume");

    let prompt = analysis_prompt(&request)
        .map_err(|e| AppError::InvalidRequest(format!("resumeData could not be encoded: {e}")))?;
    let text = state.llm.generate(&prompt, OutputFormat::Json).await?;

    let parsed: Value = serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)?;

    match parsed {
        Value::Object(report) => Ok(Json(report)),
        other => Err(AppError::ModelOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
