//! Text-generation backend abstraction.
//!
//! `LlmProvider` is an enum over concrete backend implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are immutable capabilities built once at startup and
//! injected into the router; clone them freely. `generate` is `async fn` on
//! the enum so callers need no trait-object machinery.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0}")]
    Request(String),
    #[error("backend returned no text")]
    Empty,
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Sampling settings sent with every remote request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { max_output_tokens: 100, temperature: 0.3, top_p: 0.5 }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `generate` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    TextGeneration(providers::text_generation::TextGenerationProvider),
    Gemini(providers::gemini::GeminiProvider),
}

impl LlmProvider {
    /// Send `prompt` to the backend and return its text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.generate(prompt).await,
            LlmProvider::TextGeneration(p) => p.generate(prompt).await,
            LlmProvider::Gemini(p) => p.generate(prompt).await,
        }
    }

    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::TextGeneration(_) => "text-generation",
            LlmProvider::Gemini(_) => "gemini",
        }
    }
}
