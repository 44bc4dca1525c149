// All LLM prompt templates for the gateway.
// Rendered with llm_client::prompts::render_template; JSON braces need no escaping.

use crate::gateway::models::{DescriptionRequest, ResumeAnalysisRequest, SummaryRequest};
use crate::llm_client::prompts::{render_template, to_prompt_json};

/// Professional summary prompt. Replace: {job_title}, {skills}, {current_draft}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"You are an expert career coach. Write a professional, compelling, and ATS-friendly resume summary (approx 3-4 sentences) for a {job_title}.
Key skills: {skills}.
{current_draft}

Focus on professional achievements and value proposition. Do not use "I" excessively. Keep it concise."#;

/// Clause appended to the summary prompt when the caller sent a draft. Replace: {current_summary}
pub const CURRENT_DRAFT_CLAUSE: &str = r#"Current draft to improve: "{current_summary}""#;

/// Bullet rewrite prompt. Replace: {role}, {description}
pub const DESCRIPTION_PROMPT_TEMPLATE: &str = r#"You are an expert resume editor. Rewrite the following job description bullet points for a {role} role to be more impactful, action-oriented, and ATS-friendly.

Original text:
"{description}"

Rules:
1. Use strong action verbs (Led, Developed, Engineered).
2. Quantify results where possible (e.g., "improved by 20%").
3. Keep formatting as a bulleted list (using • or -).
4. Fix any grammar or spelling errors.
5. Return ONLY the rewritten text."#;

/// ATS scan prompt. Replace: {resume_json}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Act as an ATS (Applicant Tracking System) scanner. Analyze the following resume JSON data.

Resume Data: {resume_json}

Provide the output in the following JSON format ONLY (no markdown):
{
  "score": number (0-100),
  "feedback": [string array of 3-5 concise tips to improve the resume or missing keywords based on the job title]
}"#;

pub fn summary_prompt(req: &SummaryRequest) -> String {
    let current_draft = req
        .draft()
        .map(|draft| render_template(CURRENT_DRAFT_CLAUSE, &[("current_summary", draft)]))
        .unwrap_or_default();

    render_template(
        SUMMARY_PROMPT_TEMPLATE,
        &[
            ("job_title", req.job_title.as_str()),
            ("skills", req.skills.as_str()),
            ("current_draft", current_draft.as_str()),
        ],
    )
}

pub fn description_prompt(req: &DescriptionRequest) -> String {
    render_template(
        DESCRIPTION_PROMPT_TEMPLATE,
        &[("role", req.role.as_str()), ("description", req.description.as_str())],
    )
}

pub fn analysis_prompt(req: &ResumeAnalysisRequest) -> serde_json::Result<String> {
    let resume_json = to_prompt_json(&req.resume_data)?;
    Ok(render_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("resume_json", resume_json.as_str())],
    ))
}
