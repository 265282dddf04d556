//! Backend implementations.
//!
//! `build_local` / `build_remote` are the factories called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;
pub mod text_generation;

use crate::config::{GeminiConfig, LocalConfig};
use crate::llm::{GenerationOptions, LlmProvider, ProviderError};

/// Construct the local backend named by `config.engine`.
pub fn build_local(config: &LocalConfig) -> Result<LlmProvider, ProviderError> {
    match config.engine.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "distilgpt2" | "text-generation" => {
            let p = text_generation::TextGenerationProvider::new(
                config.api_base_url.clone(),
                config.model.clone(),
                config.max_length,
                config.num_return_sequences,
                config.timeout_seconds,
            )?;
            Ok(LlmProvider::TextGeneration(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.engine.clone())),
    }
}

/// Construct the remote backend, or `None` when no credential is configured.
///
/// `api_key` is sourced from `GEMINI_API_KEY` env, never TOML.
pub fn build_remote(
    config: &GeminiConfig,
    api_key: Option<String>,
) -> Result<Option<LlmProvider>, ProviderError> {
    let Some(api_key) = api_key else {
        return Ok(None);
    };
    let options = GenerationOptions {
        max_output_tokens: config.max_output_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
    };
    let p = gemini::GeminiProvider::new(
        config.api_base_url.clone(),
        config.model.clone(),
        options,
        config.timeout_seconds,
        api_key,
    )?;
    Ok(Some(LlmProvider::Gemini(p)))
}
