//! Logging setup for the assistant.
//!
//! [`LogChoice::resolve`] settles the level once at startup from the `-v`
//! count and `[assistant] log_level` (or `MEDASSIST_LOG_LEVEL`); [`init`]
//! installs a stderr subscriber for it. `RUST_LOG` only applies when no `-v`
//! flag was given.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// HTTP stack crates that flood `debug`/`trace` with per-connection chatter.
const HTTP_STACK: &[&str] = &["hyper", "hyper_util", "h2", "rustls", "reqwest"];

/// The level the assistant logs at, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogChoice {
    pub level: LevelFilter,
    /// Chosen by `-v` flags; `RUST_LOG` is ignored.
    pub from_cli: bool,
}

impl LogChoice {
    /// `-v` flags beat the configured level. The configured level is
    /// validated either way so a typo in the config file never goes unnoticed.
    pub fn resolve(verbosity: u8, configured: &str) -> Result<Self, AppError> {
        let configured = parse_level(configured)?;
        Ok(match verbosity_level(verbosity) {
            Some(level) => Self { level, from_cli: true },
            None => Self { level: configured, from_cli: false },
        })
    }

    /// Filter directives: the chosen level, with the HTTP stack held at
    /// `warn` once the assistant itself goes below it.
    fn directives(&self) -> String {
        let mut out = self.level.to_string().to_lowercase();
        if self.level > LevelFilter::WARN {
            for krate in HTTP_STACK {
                out.push_str(&format!(",{krate}=warn"));
            }
        }
        out
    }
}

/// Install the global tracing subscriber, writing to stderr.
pub fn init(choice: &LogChoice) -> Result<(), AppError> {
    let filter = if choice.from_cli {
        EnvFilter::try_new(choice.directives())
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(choice.directives()))
    }
    .map_err(|e| AppError::Logger(format!("cannot build log filter for '{}': {e}", choice.level)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Parse `[assistant] log_level`.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log_level must not be empty".into()));
    }
    level.trim().parse::<LevelFilter>().map_err(|_| {
        AppError::Logger(format!(
            "unrecognised log_level '{level}' (expected off, error, warn, info, debug or trace)"
        ))
    })
}

/// `-v` warn, `-vv` info, `-vvv` debug, more is trace; none keeps the config.
fn verbosity_level(verbosity: u8) -> Option<LevelFilter> {
    match verbosity {
        0 => None,
        1 => Some(LevelFilter::WARN),
        2 => Some(LevelFilter::INFO),
        3 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_levels_parse() {
        for l in ["off", "error", "warn", "info", "debug", "trace", " Info "] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn bad_config_level_is_reported() {
        let err = parse_level("verbose").unwrap_err().to_string();
        assert!(err.contains("unrecognised log_level 'verbose'"), "{err}");
        assert!(parse_level("").is_err());
    }

    #[test]
    fn no_flags_keeps_configured_level() {
        let choice = LogChoice::resolve(0, "debug").unwrap();
        assert_eq!(choice, LogChoice { level: LevelFilter::DEBUG, from_cli: false });
    }

    #[test]
    fn flags_override_configured_level() {
        let choice = LogChoice::resolve(1, "debug").unwrap();
        assert_eq!(choice, LogChoice { level: LevelFilter::WARN, from_cli: true });
        assert_eq!(LogChoice::resolve(9, "info").unwrap().level, LevelFilter::TRACE);
    }

    #[test]
    fn bad_config_level_fails_even_with_flags() {
        assert!(LogChoice::resolve(3, "loud").is_err());
    }

    #[test]
    fn http_stack_is_quieted_below_warn() {
        let debug = LogChoice { level: LevelFilter::DEBUG, from_cli: true }.directives();
        assert!(debug.starts_with("debug,"), "{debug}");
        assert!(debug.contains("hyper=warn"), "{debug}");
        assert!(debug.contains("reqwest=warn"), "{debug}");

        let warn = LogChoice { level: LevelFilter::WARN, from_cli: false }.directives();
        assert_eq!(warn, "warn");
    }

    #[test]
    fn init_succeeds_or_already_installed() {
        // Another test in this process may have installed a subscriber first.
        match init(&LogChoice { level: LevelFilter::INFO, from_cli: false }) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
