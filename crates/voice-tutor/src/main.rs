//! Voice-Tutor: spoken tutoring sessions from the terminal.

mod app;
mod app_command;
mod capture_provider;
mod completion_client;
mod config;
mod error;
mod input_handler;
mod scheduler;
mod speaker;
mod status_printer;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    capture_provider::{build_capture_provider, capture_supported},
    completion_client::{HttpCompletionClient, HttpCompletionDispatcher},
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
    scheduler::TokioScheduler,
    speaker::CommandSpeaker,
    status_printer::TerminalStatus,
};

use crate::config::Config;

use std::time::Duration;

use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "voice_tutor=debug,voice_tutor_core=debug";

/// Grace period for background tasks once the loop has exited.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // The controller and its backends are !Send; everything runs on one thread.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(App { config }.run());
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    if let Err(e) = result {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
