// Prompt Gateway: summary generation, bullet rewriting and ATS-style resume scoring.
// All generation calls go through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod models;
pub mod prompts;
