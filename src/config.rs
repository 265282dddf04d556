//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or the `-f` path) relative to the current
//! working directory, then applies `MEDASSIST_LOG_LEVEL` and
//! `MEDASSIST_HTTP_BIND` env overrides. The Gemini credential comes from
//! `GEMINI_API_KEY` only and is never read from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// HTTP (axum) channel configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    /// Socket address to bind the HTTP channel to.
    pub bind: String,
    /// Upper bound on one `/api/chat` round-trip; past it the reply is `504`.
    pub chat_timeout_seconds: u64,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub http: HttpConfig,
    /// Selector label used when a request does not name a model.
    pub default_model: String,
}

/// Local text-generation backend (`[llm.local]`).
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// `"distilgpt2"` talks to a local pipeline endpoint, `"dummy"` echoes.
    pub engine: String,
    /// Full URL of the text-generation endpoint.
    pub api_base_url: String,
    pub model: String,
    pub max_length: u32,
    pub num_return_sequences: u32,
    pub timeout_seconds: u64,
}

/// Gemini backend (`[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the `/models/...` suffix.
    pub api_base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub local: LocalConfig,
    pub gemini: GeminiConfig,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub assistant_name: String,
    pub log_level: String,
    pub comms: CommsConfig,
    pub llm: LlmConfig,
    /// `GEMINI_API_KEY`. `None` (or blank) disables the remote backend.
    pub gemini_api_key: Option<String>,
}

impl Config {
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    pub fn comms_http_should_load(&self) -> bool {
        self.comms.http.enabled
    }
}

/// Env-sourced values applied on top of the TOML file.
///
/// Tests build this directly instead of mutating process env.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub http_bind: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("MEDASSIST_LOG_LEVEL").ok(),
            http_bind: env::var("MEDASSIST_HTTP_BIND").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
        }
    }
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    assistant: RawAssistant,
    #[serde(default)]
    comms: RawComms,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawAssistant {
    #[serde(default = "default_assistant_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawAssistant {
    fn default() -> Self {
        Self { name: default_assistant_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawComms {
    #[serde(default)]
    pty: RawPty,
    #[serde(default)]
    http: RawHttp,
    #[serde(default = "default_model_label")]
    default_model: String,
}

impl Default for RawComms {
    fn default() -> Self {
        Self {
            pty: RawPty::default(),
            http: RawHttp::default(),
            default_model: default_model_label(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawPty {
    /// Defaults to `false`: the console is opt-in (`-i` or config).
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_http_bind")]
    bind: String,
    #[serde(default = "default_chat_timeout_seconds")]
    chat_timeout_seconds: u64,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_http_bind(),
            chat_timeout_seconds: default_chat_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawLlm {
    #[serde(default)]
    local: RawLocal,
    #[serde(default)]
    gemini: RawGemini,
}

#[derive(Deserialize)]
struct RawLocal {
    #[serde(default = "default_local_engine")]
    engine: String,
    #[serde(default = "default_local_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_local_model")]
    model: String,
    #[serde(default = "default_local_max_length")]
    max_length: u32,
    #[serde(default = "default_num_return_sequences")]
    num_return_sequences: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawLocal {
    fn default() -> Self {
        Self {
            engine: default_local_engine(),
            api_base_url: default_local_api_base_url(),
            model: default_local_model(),
            max_length: default_local_max_length(),
            num_return_sequences: default_num_return_sequences(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawGemini {
    #[serde(default = "default_gemini_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_gemini_model")]
    model: String,
    #[serde(default = "default_gemini_max_output_tokens")]
    max_output_tokens: u32,
    #[serde(default = "default_gemini_temperature")]
    temperature: f32,
    #[serde(default = "default_gemini_top_p")]
    top_p: f32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGemini {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            max_output_tokens: default_gemini_max_output_tokens(),
            temperature: default_gemini_temperature(),
            top_p: default_gemini_top_p(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_assistant_name() -> String { "Healthcare Assistant".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_model_label() -> String { "DistilGPT-2".to_string() }
fn default_http_bind() -> String { "127.0.0.1:8501".to_string() }
fn default_chat_timeout_seconds() -> u64 { 120 }
fn default_local_engine() -> String { "distilgpt2".to_string() }
fn default_local_api_base_url() -> String { "http://127.0.0.1:8080/generate".to_string() }
fn default_local_model() -> String { "distilgpt2".to_string() }
fn default_local_max_length() -> u32 { 150 }
fn default_num_return_sequences() -> u32 { 1 }
fn default_timeout_seconds() -> u64 { 60 }
fn default_gemini_api_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_gemini_model() -> String { "gemini-pro".to_string() }
fn default_gemini_max_output_tokens() -> u32 { 100 }
fn default_gemini_temperature() -> f32 { 0.3 }
fn default_gemini_top_p() -> f32 { 0.5 }
fn default_true() -> bool { true }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `path` (or [`DEFAULT_CONFIG_PATH`]), then apply env overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let path = expand_home(path.unwrap_or(DEFAULT_CONFIG_PATH));
    load_from(&path, Overrides::from_env())
}

/// Internal loader — accepts an explicit path and overrides.
pub fn load_from(path: &Path, overrides: Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(resolve(parsed, overrides))
}

fn resolve(parsed: RawConfig, overrides: Overrides) -> Config {
    let RawConfig { assistant, comms, llm } = parsed;

    Config {
        assistant_name: assistant.name,
        log_level: overrides.log_level.unwrap_or(assistant.log_level),
        comms: CommsConfig {
            pty: PtyConfig { enabled: comms.pty.enabled },
            http: HttpConfig {
                enabled: comms.http.enabled,
                bind: overrides.http_bind.unwrap_or(comms.http.bind),
                chat_timeout_seconds: comms.http.chat_timeout_seconds,
            },
            default_model: comms.default_model,
        },
        llm: LlmConfig {
            local: LocalConfig {
                engine: llm.local.engine,
                api_base_url: llm.local.api_base_url,
                model: llm.local.model,
                max_length: llm.local.max_length,
                num_return_sequences: llm.local.num_return_sequences,
                timeout_seconds: llm.local.timeout_seconds,
            },
            gemini: GeminiConfig {
                api_base_url: llm.gemini.api_base_url.trim_end_matches('/').to_string(),
                model: llm.gemini.model,
                max_output_tokens: llm.gemini.max_output_tokens,
                temperature: llm.gemini.temperature,
                top_p: llm.gemini.top_p,
                timeout_seconds: llm.gemini.timeout_seconds,
            },
        },
        gemini_api_key: overrides
            .gemini_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy local engine, no credential.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        let mut cfg = resolve(
            toml::from_str("").expect("empty TOML is a valid RawConfig"),
            Overrides::default(),
        );
        cfg.llm.local.engine = "dummy".into();
        cfg.llm.local.api_base_url = "http://localhost:0/generate".into();
        cfg.llm.gemini.api_base_url = "http://localhost:0".into();
        cfg.llm.local.timeout_seconds = 1;
        cfg.llm.gemini.timeout_seconds = 1;
        cfg
    }
}
