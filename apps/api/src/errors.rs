use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant maps to HTTP 500 with `{"error": "<message>"}`. Callers tell
/// failure from success by the presence of the `error` key.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Model returned unusable output: {0}")]
    ModelOutput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match &self {
            AppError::InvalidRequest(_) => tracing::warn!("Rejected request: {message}"),
            AppError::Llm(_) => tracing::error!("LLM error: {message}"),
            AppError::ModelOutput(_) => tracing::error!("Model output error: {message}"),
        }

        let body = Json(json!({ "error": message }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// JSON request body extractor whose rejections go through `AppError`.
///
/// The body is parsed whatever the `Content-Type` header says. Malformed JSON,
/// missing fields and wrong types become the uniform 500 `{"error": ...}`
/// response before a handler runs.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid JSON body: {e}")))
    }
}
