//! Response router — keyword safety intercepts, then backend dispatch.
//!
//! Every request yields exactly one [`ChatResponse`]. Backend failures, a
//! missing credential and unknown selectors are all folded into the reply
//! text with `is_error = true`; nothing escapes to the caller.
//!
//! Order (first match wins):
//!
//! ```text
//! "symptom"      → consult-a-doctor advisory
//! "appointment"  → scheduling offer
//! "medication"   → adherence reminder
//! otherwise      → selected backend
//! ```
//!
//! Keyword checks run on a lowercased copy. The local backend receives the
//! original text; the remote backend receives the lowercased copy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{LlmProvider, ProviderError};

pub const SYMPTOM_REPLY: &str = "⚠️ Please consult doctor for an accurate diagnosis";
pub const APPOINTMENT_REPLY: &str = "📅 Would you like to schedule appointment with the doctor ?";
pub const MEDICATION_REPLY: &str =
    "💊 It's important to take prescribed medicine regularly.If you have any concerns, consult your doctor. ";

/// Ordered intercept table. Earlier entries take precedence.
const KEYWORD_INTERCEPTS: &[(&str, &str)] = &[
    ("symptom", SYMPTOM_REPLY),
    ("appointment", APPOINTMENT_REPLY),
    ("medication", MEDICATION_REPLY),
];

// ── Selector ──────────────────────────────────────────────────────────────────

/// Which backend handles a request that passes the keyword intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Local,
    Remote,
}

impl Selector {
    /// Presentation order.
    pub const ALL: [Selector; 2] = [Selector::Local, Selector::Remote];

    /// Label shown in the model picker.
    pub fn label(self) -> &'static str {
        match self {
            Selector::Local => "DistilGPT-2",
            Selector::Remote => "Gemini API",
        }
    }

    /// Parse a picker label, or one of the short aliases used on the console.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label == Selector::Local.label() {
            return Some(Selector::Local);
        }
        if label == Selector::Remote.label() {
            return Some(Selector::Remote);
        }
        match label.to_ascii_lowercase().as_str() {
            "local" | "distilgpt2" | "distilgpt-2" => Some(Selector::Local),
            "remote" | "gemini" => Some(Selector::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Request / response ────────────────────────────────────────────────────────

/// One user submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub raw_text: String,
    /// Picker label as received; validated by the router.
    pub backend_selector: String,
}

/// The router's answer to one [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub is_error: bool,
}

impl ChatResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: false }
    }

    pub fn from_error(err: &RouteError) -> Self {
        Self { text: err.to_string(), is_error: true }
    }
}

/// Per-request failure kinds. `Display` is the user-visible text.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("❌ Gemini API Key is missing. Please set it up in your .env file.")]
    MissingCredential,
    #[error("❌ Gemini API Error: {0}")]
    Backend(String),
    #[error("❌ DistilGPT-2 Error: {0}")]
    LocalBackend(String),
    #[error("⚠️ No response received.")]
    EmptyResponse,
    #[error("⚠️ Invalid model selection.")]
    InvalidSelector(String),
}

/// Return the fixed reply for the first keyword found in `normalized`.
pub fn keyword_intercept(normalized: &str) -> Option<&'static str> {
    KEYWORD_INTERCEPTS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, reply)| *reply)
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Immutable after construction; share as `Arc<ResponseRouter>`.
#[derive(Debug, Clone)]
pub struct ResponseRouter {
    local: LlmProvider,
    /// `None` when no credential was configured.
    remote: Option<LlmProvider>,
}

impl ResponseRouter {
    pub fn new(local: LlmProvider, remote: Option<LlmProvider>) -> Self {
        Self { local, remote }
    }

    pub fn remote_available(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn route_request(&self, request: &ChatRequest) -> ChatResponse {
        self.route(&request.raw_text, &request.backend_selector).await
    }

    /// Route with the selector still in label form.
    pub async fn route(&self, raw_text: &str, selector_label: &str) -> ChatResponse {
        let normalized = raw_text.to_lowercase();
        if let Some(reply) = keyword_intercept(&normalized) {
            debug!(selector = selector_label, "keyword intercept matched");
            return ChatResponse::reply(reply);
        }

        match Selector::from_label(selector_label) {
            Some(selector) => self.dispatch(raw_text, &normalized, selector).await,
            None => {
                warn!(selector = selector_label, "invalid model selection");
                ChatResponse::from_error(&RouteError::InvalidSelector(selector_label.to_string()))
            }
        }
    }

    /// Route with an already-parsed selector.
    pub async fn route_selected(&self, raw_text: &str, selector: Selector) -> ChatResponse {
        let normalized = raw_text.to_lowercase();
        if let Some(reply) = keyword_intercept(&normalized) {
            debug!(%selector, "keyword intercept matched");
            return ChatResponse::reply(reply);
        }
        self.dispatch(raw_text, &normalized, selector).await
    }

    async fn dispatch(&self, raw_text: &str, normalized: &str, selector: Selector) -> ChatResponse {
        let result = match selector {
            Selector::Local => self.generate_local(raw_text).await,
            Selector::Remote => self.generate_remote(normalized).await,
        };
        match result {
            Ok(text) => ChatResponse::reply(text),
            Err(e) => {
                warn!(%selector, error = %e, "backend request converted to error reply");
                ChatResponse::from_error(&e)
            }
        }
    }

    async fn generate_local(&self, prompt: &str) -> Result<String, RouteError> {
        debug!(backend = self.local.name(), "dispatching to local backend");
        self.local.generate(prompt).await.map_err(|e| match e {
            ProviderError::Empty => RouteError::EmptyResponse,
            other => RouteError::LocalBackend(other.to_string()),
        })
    }

    async fn generate_remote(&self, prompt: &str) -> Result<String, RouteError> {
        let remote = self.remote.as_ref().ok_or(RouteError::MissingCredential)?;
        debug!(backend = remote.name(), "dispatching to remote backend");
        let text = remote.generate(prompt).await.map_err(|e| match e {
            ProviderError::Empty => RouteError::EmptyResponse,
            other => RouteError::Backend(other.to_string()),
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(RouteError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;

    fn router(remote: bool) -> ResponseRouter {
        let remote = remote.then(|| LlmProvider::Dummy(DummyProvider));
        ResponseRouter::new(LlmProvider::Dummy(DummyProvider), remote)
    }

    #[test]
    fn selector_labels_round_trip() {
        for s in Selector::ALL {
            assert_eq!(Selector::from_label(s.label()), Some(s));
        }
    }

    #[test]
    fn selector_aliases() {
        assert_eq!(Selector::from_label("local"), Some(Selector::Local));
        assert_eq!(Selector::from_label("DistilGPT2"), Some(Selector::Local));
        assert_eq!(Selector::from_label("Gemini"), Some(Selector::Remote));
        assert_eq!(Selector::from_label(" Gemini API "), Some(Selector::Remote));
        assert_eq!(Selector::from_label("GPT-4"), None);
        assert_eq!(Selector::from_label(""), None);
    }

    #[test]
    fn intercept_precedence() {
        assert_eq!(keyword_intercept("symptom appointment medication"), Some(SYMPTOM_REPLY));
        assert_eq!(keyword_intercept("medication then appointment"), Some(APPOINTMENT_REPLY));
        assert_eq!(keyword_intercept("my medications"), Some(MEDICATION_REPLY));
        assert_eq!(keyword_intercept("hello"), None);
    }

    #[test]
    fn intercept_is_substring_match() {
        assert_eq!(keyword_intercept("asymptomatic"), Some(SYMPTOM_REPLY));
        assert_eq!(keyword_intercept("appointments"), Some(APPOINTMENT_REPLY));
    }

    #[tokio::test]
    async fn keyword_is_case_insensitive() {
        let r = router(false);
        let resp = r.route("I have a SYMPTOM", "DistilGPT-2").await;
        assert_eq!(resp, ChatResponse::reply(SYMPTOM_REPLY));
    }

    #[tokio::test]
    async fn appointment_example_for_any_selector() {
        let r = router(false);
        for label in ["DistilGPT-2", "Gemini API", "nonsense"] {
            let resp = r.route("What is my appointment status?", label).await;
            assert_eq!(resp.text, "📅 Would you like to schedule appointment with the doctor ?");
            assert!(!resp.is_error);
        }
    }

    #[tokio::test]
    async fn local_gets_original_case() {
        let r = router(false);
        let resp = r.route("Hello There", "DistilGPT-2").await;
        assert_eq!(resp, ChatResponse::reply("[echo] Hello There"));
    }

    #[tokio::test]
    async fn remote_gets_lowercased_text() {
        let r = router(true);
        let resp = r.route("Hello There", "Gemini API").await;
        assert_eq!(resp, ChatResponse::reply("[echo] hello there"));
    }

    #[tokio::test]
    async fn remote_without_credential() {
        let r = router(false);
        let resp = r.route("hello", "Gemini API").await;
        assert!(resp.is_error);
        assert_eq!(resp.text, "❌ Gemini API Key is missing. Please set it up in your .env file.");
    }

    #[tokio::test]
    async fn invalid_selector() {
        let r = router(true);
        let resp = r.route("hello", "GPT-4").await;
        assert!(resp.is_error);
        assert_eq!(resp.text, "⚠️ Invalid model selection.");
    }

    #[tokio::test]
    async fn route_selected_matches_label_form() {
        let r = router(true);
        assert_eq!(
            r.route_selected("hello", Selector::Remote).await,
            r.route("hello", "Gemini API").await
        );
        assert_eq!(
            r.route_selected("new symptom", Selector::Local).await,
            ChatResponse::reply(SYMPTOM_REPLY)
        );
    }

    #[tokio::test]
    async fn route_request_uses_fields() {
        let r = router(false);
        let req = ChatRequest { raw_text: "Hi".into(), backend_selector: "local".into() };
        assert_eq!(r.route_request(&req).await.text, "[echo] Hi");
    }

    #[test]
    fn route_error_texts() {
        assert_eq!(
            RouteError::Backend("quota exceeded".into()).to_string(),
            "❌ Gemini API Error: quota exceeded"
        );
        assert_eq!(RouteError::EmptyResponse.to_string(), "⚠️ No response received.");
        let resp = ChatResponse::from_error(&RouteError::LocalBackend("connection refused".into()));
        assert!(resp.is_error);
        assert!(resp.text.contains("connection refused"));
    }

    #[test]
    fn remote_availability() {
        assert!(router(true).remote_available());
        assert!(!router(false).remote_available());
    }
}
