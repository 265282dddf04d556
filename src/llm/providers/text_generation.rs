//! Local text-generation provider (DistilGPT-2 by default).
//!
//! Talks to a local model server over the Hugging Face request shape:
//! `POST {api_base_url}` with `{"inputs", "parameters"}`. Both reply shapes
//! are accepted: the pipeline's `[{"generated_text": ...}]` list and
//! text-generation-inference's `{"generated_text": ...}` object. The first
//! text is returned unmodified. All wire types are private.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

/// Adapter for a local text-generation pipeline endpoint.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct TextGenerationProvider {
    client: Client,
    api_base_url: String,
    model: String,
    max_length: u32,
    num_return_sequences: u32,
}

impl TextGenerationProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        max_length: u32,
        num_return_sequences: u32,
        timeout_seconds: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, max_length, num_return_sequences })
    }

    /// One generation round-trip for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_length: self.max_length,
                num_return_sequences: self.num_return_sequences,
            },
        };

        debug!(
            model = %self.model,
            max_length = self.max_length,
            prompt_len = prompt.len(),
            "sending local generation request"
        );

        let response = self
            .client
            .post(&self.api_base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "local generation request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to read response body: {e}")))?;

        let parsed = serde_json::from_str::<GenerateResponse>(&body).map_err(|e| {
            error!(error = %e, "failed to deserialize local generation response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        parsed.into_first_text().ok_or(ProviderError::Empty)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_length: u32,
    num_return_sequences: u32,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Pipeline servers reply with a candidate list; text-generation-inference's
/// `/generate` replies with a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Candidates(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl GenerateResponse {
    fn into_first_text(self) -> Option<String> {
        match self {
            GenerateResponse::Candidates(candidates) => {
                trace!(candidates = candidates.len(), "received local generation response");
                candidates.into_iter().next().map(|c| c.generated_text)
            }
            GenerateResponse::Single(c) => Some(c.generated_text),
        }
    }
}

/// `{"error": "..."}` envelope used by pipeline servers.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
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

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => format!("HTTP {status}: {}", env.error),
        Err(_) => format!("HTTP {status}: {body}"),
    };

    error!(%status, %message, "local generation returned HTTP error");
    Err(ProviderError::Request(message))
}
