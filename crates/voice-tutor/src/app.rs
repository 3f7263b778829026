use crate::{
    AppCommand, AppResult, CommandSpeaker, HttpCompletionClient, HttpCompletionDispatcher,
    InputHandler, TerminalStatus, TokioScheduler, build_capture_provider, capture_supported,
    config::Config,
};

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use voice_tutor_core::{
    Backends, Capabilities, PlaybackBackend, SessionEvent, VoiceSessionController,
};

/// How long to wait for the input reader after the loop exits.
const INPUT_SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// Main application state.
///
/// Owns the session controller on the runtime's only thread. Every backend
/// reports back through the session event channel, so the controller is
/// never touched from anywhere else.
pub struct App {
    pub(crate) config: Config,
}

impl App {
    /// Run the main application event loop until quit or Ctrl-C.
    #[instrument(skip(self))]
    pub(crate) async fn run(self) -> AppResult<()> {
        info!("Voice-Tutor starting");

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
        let (command_tx, mut command_rx) = mpsc::channel::<AppCommand>(32);

        let client = HttpCompletionClient::new(&self.config.completion)?;
        let speaker = CommandSpeaker::from_config(&self.config.playback, event_tx.clone());

        let capabilities = Capabilities::new(
            capture_supported(&self.config),
            speaker.is_some(),
        );

        let backends = Backends {
            capture: build_capture_provider(&self.config, event_tx.clone()),
            playback: speaker.map(|s| Box::new(s) as Box<dyn PlaybackBackend>),
            completion: Box::new(HttpCompletionDispatcher::new(client, event_tx.clone())),
            scheduler: Box::new(TokioScheduler::new(event_tx)),
            status: Box::new(TerminalStatus::new(std::io::stdout())),
        };

        let mut controller =
            VoiceSessionController::new(capabilities, backends, self.config.controller_settings());

        let input_handle = InputHandler::new(command_tx).spawn();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        AppCommand::ToggleSession => controller.toggle(),
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                Some(event) = event_rx.recv() => controller.handle(event),

                result = &mut ctrl_c => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for Ctrl-C");
                    }
                    info!("Interrupted");
                    break;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        controller.shutdown();
        drop(controller);
        drop(command_rx);

        // Blocked on stdin until the next line; abandoned at runtime shutdown.
        if tokio::time::timeout(INPUT_SHUTDOWN_GRACE, input_handle)
            .await
            .is_err()
        {
            info!("Input reader still waiting on stdin, leaving it to exit");
        }

        info!("Voice-Tutor shut down successfully");

        Ok(())
    }
}
