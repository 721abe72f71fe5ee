//! Console command source.
//!
//! Reads lines from stdin, parses them into [`AppCommand`]s and forwards
//! them to the application over an async channel. Unknown commands are
//! reported and skipped.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use pocket_recorder_core::{AppState, InterruptionKind};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Usage text printed by `help` and after an unknown command.
pub(crate) const USAGE: &str = "\
commands:
  record | pause | resume | stop          recording
  list                                    saved recordings
  play <id> | pause-playback | resume-playback | stop-playback
  seek <seconds> | volume <0..1> | rate <speed>
  delete <id>
  interrupt <call|notification|other_app|system_alert>
  background | foreground                 app state
  continue                                resume after an interruption
  help | quit";

/// Parse one console line.
///
/// Returns `Ok(None)` for blank lines and `help`.
#[track_caller]
pub(crate) fn parse_command(line: &str) -> AppResult<Option<AppCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if words.next().is_some() {
        return Err(invalid(line, "too many arguments"));
    }

    let command = match (verb.to_ascii_lowercase().as_str(), argument) {
        ("help" | "?", None) => return Ok(None),
        ("record" | "rec", None) => AppCommand::Record,
        ("pause", None) => AppCommand::Pause,
        ("resume", None) => AppCommand::Resume,
        ("stop", None) => AppCommand::Stop,
        ("list" | "ls", None) => AppCommand::List,
        ("play", Some(id)) => AppCommand::Play(id.to_string()),
        ("pause-playback", None) => AppCommand::PausePlayback,
        ("resume-playback", None) => AppCommand::ResumePlayback,
        ("stop-playback", None) => AppCommand::StopPlayback,
        ("seek", Some(value)) => AppCommand::Seek(parse_number(line, value)?),
        ("volume", Some(value)) => AppCommand::Volume(parse_number(line, value)?),
        ("rate", Some(value)) => AppCommand::Rate(parse_number(line, value)?),
        ("delete" | "rm", Some(id)) => AppCommand::Delete(id.to_string()),
        ("interrupt", Some(kind)) => {
            let kind: InterruptionKind = kind.parse().map_err(|e: String| invalid(line, e))?;
            AppCommand::Interrupt(kind)
        }
        ("background", None) => AppCommand::AppState(AppState::Background),
        ("foreground", None) => AppCommand::AppState(AppState::Active),
        ("continue", None) => AppCommand::ResumeAfterInterruption,
        ("quit" | "exit", None) => AppCommand::Shutdown,
        (
            "play" | "seek" | "volume" | "rate" | "delete" | "rm" | "interrupt",
            None,
        ) => return Err(invalid(line, "missing argument")),
        (
            "record" | "rec" | "pause" | "resume" | "stop" | "list" | "ls" | "pause-playback"
            | "resume-playback" | "stop-playback" | "background" | "foreground" | "continue"
            | "quit" | "exit" | "help" | "?",
            Some(_),
        ) => return Err(invalid(line, "unexpected argument")),
        _ => return Err(invalid(line, "unknown command")),
    };

    Ok(Some(command))
}

#[track_caller]
fn parse_number<T: std::str::FromStr>(line: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| invalid(line, format!("'{value}' is not a number: {e}")))
}

#[track_caller]
fn invalid(line: &str, reason: impl Into<String>) -> AppError {
    AppError::InvalidCommand {
        input: line.trim().to_string(),
        reason: reason.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Reads console commands until stdin closes or shutdown is signalled.
pub struct ConsoleInput {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleInput {
    /// Create an input that forwards commands to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the console read loop.
    ///
    /// End of input is treated as a shutdown request.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{USAGE}");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console input shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Console input closed, requesting shutdown");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };

                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            debug!(command = ?command, "Console command");
                            let shutdown = command == AppCommand::Shutdown;
                            self.send(command).await?;
                            if shutdown {
                                break;
                            }
                        }
                        Ok(None) => {
                            if !line.trim().is_empty() {
                                println!("{USAGE}");
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Ignoring console input");
                            println!("? {}  (type 'help')", line.trim());
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send console command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
