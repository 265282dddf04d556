//! PTY (console) channel — reads lines from stdin, routes them, prints the
//! reply to stdout.
//!
//! Besides plain questions the console understands two commands:
//! `/models` lists the pickers and `/model <label>` switches backend.
//! Runs until the `shutdown` token is cancelled (Ctrl-C) or stdin closes.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{CommsEvent, CommsState, EMPTY_MESSAGE_NOTICE};
use crate::error::AppError;
use crate::router::Selector;
use crate::subsystems::runtime::{Channel, ChannelFuture};

// ── Input parsing ─────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput<'a> {
    Empty,
    ListModels,
    SwitchModel(Option<Selector>),
    Question(&'a str),
}

/// Only a bare line counts as empty. Commands are matched on the trimmed
/// text, questions are routed as typed (line terminator removed).
fn parse_line(line: &str) -> ConsoleInput<'_> {
    let raw = line.trim_end_matches(['\r', '\n']);
    if raw.is_empty() {
        return ConsoleInput::Empty;
    }
    let command = raw.trim();
    if command == "/models" {
        return ConsoleInput::ListModels;
    }
    if let Some(label) = command.strip_prefix("/model ") {
        return ConsoleInput::SwitchModel(Selector::from_label(label));
    }
    ConsoleInput::Question(raw)
}

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), state }
    }
}

impl Channel for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        Box::pin(run_pty(self.channel_id, self.state, shutdown))
    }
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn run_pty(
    channel_id: String,
    state: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let mut selector = state.default_selector();

    info!(%channel_id, %selector, "pty channel started");
    println!("─────────────────────────────────────────────");
    println!(" Healthcare Assistant Chatbot  (Ctrl-C to quit)");
    println!(" 🤖 Ask me any medical question!");
    println!(" /models to list, /model <name> to switch");
    println!("─────────────────────────────────────────────");
    state.report_event(CommsEvent::SessionStarted { channel_id: channel_id.clone() });

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("[{selector}] > ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!();
                info!("pty channel shutting down");
                break;
            }

            line = lines.next_line() => {
                let line = match line {
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("pty stdin closed");
                        break;
                    }
                    Ok(Some(line)) => line,
                };

                match parse_line(&line) {
                    ConsoleInput::Empty => println!("{EMPTY_MESSAGE_NOTICE}"),
                    ConsoleInput::ListModels => {
                        for s in Selector::ALL {
                            let marker = if s == selector { "*" } else { " " };
                            let note = if s == Selector::Remote && !state.remote_available() {
                                "  (no API key)"
                            } else {
                                ""
                            };
                            println!(" {marker} {s}{note}");
                        }
                    }
                    ConsoleInput::SwitchModel(Some(s)) => {
                        selector = s;
                        debug!(%channel_id, %selector, "pty selector switched");
                        println!("model: {selector}");
                    }
                    ConsoleInput::SwitchModel(None) => println!("⚠️ Invalid model selection."),
                    ConsoleInput::Question(text) => {
                        println!("🧑‍💻 User: {text}");
                        println!("Processing your queries Please wait.......");
                        let reply = state.send_message(&channel_id, text, Some(selector.label())).await;
                        println!("🤖 Healthcare Assistant : {}", reply.text);
                    }
                }
            }
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_lines_are_empty() {
        assert_eq!(parse_line(""), ConsoleInput::Empty);
        assert_eq!(parse_line("\r\n"), ConsoleInput::Empty);
    }

    #[test]
    fn whitespace_only_line_is_a_question() {
        assert_eq!(parse_line("   \t"), ConsoleInput::Question("   \t"));
    }

    #[test]
    fn model_commands() {
        assert_eq!(parse_line("/models"), ConsoleInput::ListModels);
        assert_eq!(parse_line("  /models \r"), ConsoleInput::ListModels);
        assert_eq!(parse_line("/model gemini"), ConsoleInput::SwitchModel(Some(Selector::Remote)));
        assert_eq!(parse_line("/model DistilGPT-2"), ConsoleInput::SwitchModel(Some(Selector::Local)));
        assert_eq!(parse_line("/model bard"), ConsoleInput::SwitchModel(None));
    }

    #[test]
    fn questions_keep_spacing_and_case() {
        assert_eq!(parse_line("  What is Flu? \n"), ConsoleInput::Question("  What is Flu? "));
    }

    #[test]
    fn channel_id_is_exposed() {
        let ch = PtyChannel::new("pty0", CommsState::test_default());
        assert_eq!(ch.id(), "pty0");
    }
}
