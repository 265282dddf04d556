//! The shipped config file must load and keep the documented defaults.

use std::path::Path;

use medassist_bot::config::{DEFAULT_CONFIG_PATH, Overrides, load_from};
use medassist_bot::llm::providers;
use medassist_bot::router::Selector;

#[test]
fn default_config_file_exists() {
    assert!(Path::new(DEFAULT_CONFIG_PATH).exists(), "config/default.toml missing");
}

#[test]
fn default_config_file_loads() {
    let cfg = load_from(Path::new(DEFAULT_CONFIG_PATH), Overrides::default()).unwrap();
    assert!(cfg.comms.http.enabled);
    assert_eq!(cfg.comms.http.chat_timeout_seconds, 120);
    assert!(Selector::from_label(&cfg.comms.default_model).is_some());
    assert_eq!(cfg.llm.local.max_length, 150);
    assert_eq!(cfg.llm.local.num_return_sequences, 1);
    assert_eq!(cfg.llm.gemini.max_output_tokens, 100);
    assert_eq!(cfg.llm.gemini.temperature, 0.3);
    assert_eq!(cfg.llm.gemini.top_p, 0.5);
}

#[test]
fn default_config_builds_backends() {
    let cfg = load_from(Path::new(DEFAULT_CONFIG_PATH), Overrides::default()).unwrap();
    assert!(providers::build_local(&cfg.llm.local).is_ok());
    assert!(providers::build_remote(&cfg.llm.gemini, None).unwrap().is_none());
}
