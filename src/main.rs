//! Healthcare assistant — entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args, load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config) and init logger
//!   4. Build the local and remote backends, then the router
//!   5. Spawn Ctrl-C → shutdown signal watcher
//!   6. Run comms channels until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use medassist_bot::{
    config,
    error::AppError,
    llm::providers,
    logger::{self, LogChoice},
    router::ResponseRouter,
    subsystems::comms,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Optional file; a missing .env is not an error.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if args.interactive {
        config.comms.pty.enabled = true;
    }

    let log_choice = LogChoice::resolve(args.verbosity, &config.log_level)?;
    logger::init(&log_choice)?;

    info!(
        assistant = %config.assistant_name,
        configured_log_level = %config.log_level,
        effective_log_level = %log_choice.level,
        log_level_from_cli = log_choice.from_cli,
        local_engine = %config.llm.local.engine,
        gemini_model = %config.llm.gemini.model,
        "config loaded"
    );

    let local = providers::build_local(&config.llm.local)?;
    let remote = providers::build_remote(&config.llm.gemini, config.gemini_api_key.clone())?;
    if remote.is_some() {
        info!("gemini API key loaded");
    } else {
        warn!("gemini API key not found — use DistilGPT-2 instead");
    }

    let router = Arc::new(ResponseRouter::new(local, remote));

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let result = comms::start(&config, router, shutdown).join().await;

    info!("shutdown complete");
    result
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    verbosity: u8,
    interactive: bool,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut interactive = false;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: medassist-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -i, --interactive          Enable the console channel");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-i" | "--interactive" => interactive = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { verbosity, interactive, config_path }
}
