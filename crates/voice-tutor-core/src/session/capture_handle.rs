use crate::{CaptureBackend, SessionResult};

use tracing::debug;

/// Controller-side wrapper around the capture backend.
///
/// `running` follows the backend's own started/ended signals. The caller
/// never assumes it: a `start()` request leaves it untouched until the
/// backend confirms.
pub(crate) struct CaptureHandle {
    backend: Box<dyn CaptureBackend>,
    running: bool,
}

impl CaptureHandle {
    pub(crate) fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            running: false,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Request capture. No-op while already running.
    pub(crate) fn start(&mut self) -> SessionResult<()> {
        if self.running {
            debug!("Capture already running, start ignored");
            return Ok(());
        }
        self.backend.start()
    }

    /// Request a stop if capture is running.
    pub(crate) fn stop(&mut self) {
        if self.running {
            self.backend.stop();
        }
    }

    pub(crate) fn on_started(&mut self) {
        self.running = true;
    }

    pub(crate) fn on_ended(&mut self) {
        self.running = false;
    }
}
