//! Google Gemini provider (`models/{model}:generateContent`).
//!
//! Single-turn only: the prompt goes out as one `user` content block with the
//! configured [`GenerationOptions`]. The credential travels in the
//! `x-goog-api-key` header so it never shows up in URLs or logs.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{GenerationOptions, ProviderError};

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    options: GenerationOptions,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        options: GenerationOptions,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, options, api_key })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model)
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![PartOut { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.options.max_output_tokens,
                temperature: self.options.temperature,
                top_p: self.options.top_p,
            },
        };

        debug!(
            model = %self.model,
            max_output_tokens = self.options.max_output_tokens,
            temperature = self.options.temperature,
            top_p = self.options.top_p,
            prompt_len = prompt.len(),
            "sending gemini request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "gemini request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to read response body: {e}")))?;

        let parsed = serde_json::from_str::<GenerateContentResponse>(&body).map_err(|e| {
            error!(error = %e, "failed to deserialize gemini response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        trace!(candidates = parsed.candidates.len(), "received gemini response");

        extract_text(parsed).ok_or(ProviderError::Empty)
    }
}

/// Join the first candidate's parts and trim; `None` when nothing is left.
fn extract_text(resp: GenerateContentResponse) -> Option<String> {
    let candidate = resp.candidates.into_iter().next()?;
    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<PartOut<'a>>,
}

#[derive(Debug, Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Deserialize)]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
}

// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env.error.status.map(|s| format!(" [{s}]")).unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "gemini request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::stub;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};

    const ROUTE: &str = "/v1beta/models/gemini-pro:generateContent";

    fn provider(base: &str) -> GeminiProvider {
        GeminiProvider::new(
            format!("{base}/v1beta"),
            "gemini-pro".into(),
            GenerationOptions::default(),
            5,
            "test-key".into(),
        )
        .unwrap()
    }

    fn reply(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn endpoint_joins_model() {
        let p = provider("http://host");
        assert_eq!(p.endpoint(), "http://host/v1beta/models/gemini-pro:generateContent");
    }

    #[tokio::test]
    async fn returns_trimmed_text() {
        let router = Router::new().route(ROUTE, post(|| async { Json(reply("  Drink water.\n")) }));
        let base = stub::serve(router).await;
        assert_eq!(provider(&base).generate("hi").await.unwrap(), "Drink water.");
    }

    #[tokio::test]
    async fn sends_key_header_and_generation_config() {
        let router = Router::new().route(
            ROUTE,
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let cfg = &body["generationConfig"];
                let summary = format!(
                    "{key}|{}|{}|{}|{}",
                    cfg["maxOutputTokens"],
                    cfg["temperature"].as_f64().map(|t| (t * 10.0).round()).unwrap_or(-1.0),
                    cfg["topP"].as_f64().map(|t| (t * 10.0).round()).unwrap_or(-1.0),
                    body["contents"][0]["parts"][0]["text"].as_str().unwrap_or(""),
                );
                Json(reply(&summary))
            }),
        );
        let base = stub::serve(router).await;
        let out = provider(&base).generate("what is flu").await.unwrap();
        assert_eq!(out, "test-key|100|3|5|what is flu");
    }

    #[tokio::test]
    async fn multiple_parts_are_joined() {
        let router = Router::new().route(
            ROUTE,
            post(|| async {
                Json(json!({ "candidates": [{ "content": { "parts": [{ "text": "Rest " }, { "text": "well." }] } }] }))
            }),
        );
        let base = stub::serve(router).await;
        assert_eq!(provider(&base).generate("x").await.unwrap(), "Rest well.");
    }

    #[tokio::test]
    async fn no_candidates_is_empty_error() {
        let router = Router::new().route(ROUTE, post(|| async { Json(json!({ "candidates": [] })) }));
        let base = stub::serve(router).await;
        assert!(matches!(provider(&base).generate("x").await, Err(ProviderError::Empty)));
    }

    #[tokio::test]
    async fn blank_text_is_empty_error() {
        let router = Router::new().route(ROUTE, post(|| async { Json(reply("   ")) }));
        let base = stub::serve(router).await;
        assert!(matches!(provider(&base).generate("x").await, Err(ProviderError::Empty)));
    }

    #[tokio::test]
    async fn malformed_body_reports_decode_cause() {
        let router = Router::new().route(ROUTE, post(|| async { Json(json!({ "candidates": "nope" })) }));
        let base = stub::serve(router).await;
        let msg = provider(&base).generate("x").await.unwrap_err().to_string();
        assert!(msg.starts_with("failed to parse response body: invalid type"), "{msg}");
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let router = Router::new().route(
            ROUTE,
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } })),
                )
            }),
        );
        let base = stub::serve(router).await;
        let msg = provider(&base).generate("x").await.unwrap_err().to_string();
        assert!(msg.contains("400"), "{msg}");
        assert!(msg.contains("INVALID_ARGUMENT"), "{msg}");
        assert!(msg.contains("API key not valid"), "{msg}");
    }
}
