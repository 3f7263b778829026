//! Terminal control surface: one line per command on stdin.

use crate::{AppCommand, AppError, AppResult};

use std::{io::BufRead, panic::Location};

use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

/// Map one input line to a command. Unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<AppCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "t" | "toggle" => Some(AppCommand::ToggleSession),
        "q" | "quit" | "exit" => Some(AppCommand::Shutdown),
        _ => None,
    }
}

/// Forwards stdin commands to the main loop.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl InputHandler {
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Read stdin on a blocking task until EOF, quit, or the loop goes away.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            if let Err(e) = self.forward(stdin.lock()) {
                debug!(error = ?e, "Input forwarding stopped");
            }
        })
    }

    /// Forward commands from `reader`. EOF counts as a quit request.
    #[track_caller]
    pub fn forward<R: BufRead>(&self, reader: R) -> AppResult<()> {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(error = ?e, "Failed to read terminal input");
                    return Err(e.into());
                }
            };

            let Some(command) = parse_command(&line) else {
                warn!(input_len = line.len(), "Unknown command, use Enter to toggle or q to quit");
                continue;
            };

            self.send(command)?;
            if command == AppCommand::Shutdown {
                return Ok(());
            }
        }

        info!("Terminal input closed");
        self.send(AppCommand::Shutdown)
    }

    #[track_caller]
    fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .blocking_send(command)
            .map_err(|e| AppError::ChannelSendFailed {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
