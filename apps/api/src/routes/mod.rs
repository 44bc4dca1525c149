pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::gateway::handlers;
use crate::state::AppState;

/// Prompt Gateway routes. POST only; other methods get 405 from the router.
fn gateway_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/generate-summary/",
            post(handlers::handle_generate_summary),
        )
        .route(
            "/enhance-description/",
            post(handlers::handle_enhance_description),
        )
        .route("/analyze-resume/", post(handlers::handle_analyze_resume))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .merge(gateway_routes())
        // Prefix used by the browser client
        .nest("/api", gateway_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::{LlmError, OutputFormat, TextGenerator};

    /// Records every call and answers with a canned reply.
    struct FakeGenerator {
        reply: Result<String, String>,
        calls: Mutex<Vec<(String, OutputFormat)>>,
    }

    impl FakeGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, OutputFormat)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str, format: OutputFormat) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push((prompt.to_string(), format));
            self.reply.clone().map_err(|message| LlmError::Api {
                status: 429,
                message,
            })
        }
    }

    fn app(generator: Arc<FakeGenerator>) -> Router {
        build_router(AppState::new(generator))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            app(FakeGenerator::replying("")),
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_summary_without_draft() {
        let fake = FakeGenerator::replying("Seasoned engineer with a record of delivery.");
        let (status, body) = post_json(
            app(fake.clone()),
            "/generate-summary/",
            r#"{"jobTitle":"Software Engineer","skills":"Go, distributed systems","currentSummary":""}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "summary": "Seasoned engineer with a record of delivery." })
        );

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        let (prompt, format) = &calls[0];
        assert_eq!(*format, OutputFormat::Text);
        assert!(prompt.contains("Software Engineer"));
        assert!(prompt.contains("Go, distributed systems"));
        assert!(!prompt.contains("Current draft to improve"));
    }

    #[tokio::test]
    async fn test_generate_summary_with_draft() {
        let fake = FakeGenerator::replying("Improved.");
        let (status, _) = post_json(
            app(fake.clone()),
            "/generate-summary/",
            r#"{"jobTitle":"Designer","skills":"Figma","currentSummary":"I design things."}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let (prompt, _) = &fake.calls()[0];
        assert!(prompt.contains(r#"Current draft to improve: "I design things.""#));
    }

    #[tokio::test]
    async fn test_enhance_description() {
        let fake = FakeGenerator::replying("• Led migration of 3 services");
        let (status, body) = post_json(
            app(fake.clone()),
            "/enhance-description/",
            r#"{"description":"- moved services","role":"Platform Engineer"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "enhancedDescription": "• Led migration of 3 services" })
        );
        let (prompt, format) = &fake.calls()[0];
        assert_eq!(*format, OutputFormat::Text);
        assert!(prompt.contains("Platform Engineer"));
        assert!(prompt.contains("- moved services"));
    }

    #[tokio::test]
    async fn test_analyze_resume_echoes_model_json() {
        let upstream = r#"{"score":72,"feedback":["Add more keywords","Quantify achievements"]}"#;
        let fake = FakeGenerator::replying(upstream);
        let (status, body) = post_json(
            app(fake.clone()),
            "/analyze-resume/",
            r#"{"resumeData":{"title":"Engineer","skills":[]}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "score": 72, "feedback": ["Add more keywords", "Quantify achievements"] })
        );

        let (prompt, format) = &fake.calls()[0];
        assert_eq!(*format, OutputFormat::Json);
        assert!(prompt.contains(r#"{"title": "Engineer", "skills": []}"#));
    }

    #[tokio::test]
    async fn test_analyze_resume_passes_extra_fields_through() {
        let fake = FakeGenerator::replying(r#"{"score":150,"feedback":[],"note":"x"}"#);
        let (status, body) = post_json(
            app(fake),
            "/analyze-resume/",
            r#"{"resumeData":{"title":"Engineer"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "score": 150, "feedback": [], "note": "x" }));
    }

    #[tokio::test]
    async fn test_analyze_resume_invalid_model_json_is_500() {
        let fake = FakeGenerator::replying("Score: 72. Looks good!");
        let (status, body) = post_json(
            app(fake),
            "/analyze-resume/",
            r#"{"resumeData":{"title":"Engineer"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_resume_non_object_model_json_is_500() {
        let fake = FakeGenerator::replying("[72]");
        let (status, body) = post_json(
            app(fake),
            "/analyze-resume/",
            r#"{"resumeData":{"title":"Engineer"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("an array"));
    }

    #[tokio::test]
    async fn test_analyze_resume_null_data_is_rejected_before_generation() {
        let fake = FakeGenerator::replying("{}");
        let (status, body) = post_json(
            app(fake.clone()),
            "/analyze-resume/",
            r#"{"resumeData":null}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "resumeData is required" }));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_500_without_generation() {
        for uri in ["/generate-summary/", "/enhance-description/", "/analyze-resume/"] {
            let fake = FakeGenerator::replying("unused");
            let (status, body) = post_json(app(fake.clone()), uri, "{not json").await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri: {uri}");
            assert!(body["error"].is_string(), "uri: {uri}");
            assert!(fake.calls().is_empty(), "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_required_field_is_500() {
        let fake = FakeGenerator::replying("unused");
        let (status, body) = post_json(
            app(fake.clone()),
            "/generate-summary/",
            r#"{"jobTitle":"Software Engineer"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("skills"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_still_parsed() {
        let fake = FakeGenerator::replying("Triage-focused nurse.");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/generate-summary/")
            .body(Body::from(r#"{"jobTitle":"Nurse","skills":"Triage"}"#))
            .unwrap();
        let (status, body) = send(app(fake.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "summary": "Triage-focused nurse." }));
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_enhance_description_missing_role_is_500() {
        let fake = FakeGenerator::replying("unused");
        let (status, body) = post_json(
            app(fake.clone()),
            "/enhance-description/",
            r#"{"description":"- did work"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("role"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_resume_missing_resume_data_is_500() {
        let fake = FakeGenerator::replying("{}");
        let (status, body) = post_json(app(fake.clone()), "/analyze-resume/", "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("resumeData"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_resume_upstream_failure_is_500() {
        let fake = FakeGenerator::failing("quota exceeded");
        let (status, body) = post_json(
            app(fake.clone()),
            "/analyze-resume/",
            r#"{"resumeData":{"title":"Engineer"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "API error (status 429): quota exceeded" })
        );
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_resume_keeps_number_text_exact() {
        let upstream = r#"{"score":72,"feedback":[],"id":123456789012345678901234567890,"ratio":1.50}"#;
        let fake = FakeGenerator::replying(upstream);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/analyze-resume/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"resumeData":{"title":"Engineer"}}"#))
            .unwrap();

        let response = app(fake).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), upstream);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_with_message() {
        let fake = FakeGenerator::failing("Resource has been exhausted");
        let (status, body) = post_json(
            app(fake.clone()),
            "/enhance-description/",
            r#"{"description":"- did work","role":"Analyst"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "API error (status 429): Resource has been exhausted" })
        );
        assert_eq!(fake.calls().len(), 1, "no retry on failure");
    }

    #[tokio::test]
    async fn test_non_post_methods_are_rejected() {
        for uri in ["/generate-summary/", "/enhance-description/", "/analyze-resume/"] {
            for method in [Method::GET, Method::PUT, Method::DELETE] {
                let fake = FakeGenerator::replying("unused");
                let request = Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap();
                let response = app(fake.clone()).oneshot(request).await.unwrap();

                assert_eq!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED,
                    "{method} {uri}"
                );
                assert!(fake.calls().is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_api_prefix_serves_same_routes() {
        let fake = FakeGenerator::replying("Summary text");
        let (status, body) = post_json(
            app(fake),
            "/api/generate-summary/",
            r#"{"jobTitle":"Nurse","skills":"Triage"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "summary": "Summary text" }));
    }
}
