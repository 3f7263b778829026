//! Seams between the state machine and the outside world.
//!
//! Each capability is a small trait so the controller can be driven by
//! platform backends in the binary and by in-memory fakes in tests.

use crate::{Scheduler, SessionResult, SessionState, StatusLabel, Turn, UtteranceId};

use uuid::Uuid;

/// Platform speech-to-text.
///
/// `start` and `stop` only issue requests. The backend reports what actually
/// happened later, as [`CaptureSignal`](crate::CaptureSignal)s.
pub trait CaptureBackend {
    /// Begin listening. Calling this while already listening must be harmless.
    fn start(&mut self) -> SessionResult<()>;

    /// Ask the backend to stop listening without producing a transcript.
    fn stop(&mut self);
}

/// Creates the capture backend on first use.
pub trait CaptureProvider {
    /// Build a backend, or report `CaptureUnsupported`.
    fn create(&mut self) -> SessionResult<Box<dyn CaptureBackend>>;
}

/// Platform text-to-speech.
pub trait PlaybackBackend {
    /// Start speaking `text`, replacing anything currently playing.
    ///
    /// Returns an error when playback could not even begin; in that case no
    /// signals will be delivered for `id`.
    fn speak(&mut self, id: UtteranceId, text: &str) -> Result<(), String>;

    /// Silence any utterance in progress.
    fn cancel(&mut self);
}

/// A request for the tutor's next reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Session the reply is for.
    pub session_id: Uuid,
    /// Full conversation so far, oldest first.
    pub messages: Vec<Turn>,
}

/// Sends completion requests; the outcome comes back as
/// [`SessionEvent::Completion`](crate::SessionEvent::Completion).
pub trait CompletionDispatcher {
    /// Fire the request. Must not block.
    fn dispatch(&mut self, request: CompletionRequest);
}

/// Receives every state change together with the label to display.
pub trait StatusSink {
    /// Show the current state and label.
    fn show(&mut self, state: SessionState, label: StatusLabel);
}

/// Availability of the voice capabilities, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Speech capture can be used.
    pub capture_supported: bool,
    /// Speech playback can be used.
    pub playback_supported: bool,
}

impl Capabilities {
    /// Capability flags as detected by the host.
    pub fn new(capture_supported: bool, playback_supported: bool) -> Self {
        Self {
            capture_supported,
            playback_supported,
        }
    }

    /// Label to show before any session starts.
    pub fn initial_label(&self) -> StatusLabel {
        match (self.capture_supported, self.playback_supported) {
            (false, false) => StatusLabel::VoiceUnsupported,
            (false, true) => StatusLabel::NoMicSupport,
            _ => StatusLabel::Ready,
        }
    }
}

/// The collaborators handed to [`VoiceSessionController::new`](crate::VoiceSessionController::new).
pub struct Backends {
    /// Lazily builds the capture backend.
    pub capture: Box<dyn CaptureProvider>,
    /// Playback backend, if the platform has one.
    pub playback: Option<Box<dyn PlaybackBackend>>,
    /// Completion service.
    pub completion: Box<dyn CompletionDispatcher>,
    /// Timer service for the capture restart delay.
    pub scheduler: Box<dyn Scheduler>,
    /// Status display.
    pub status: Box<dyn StatusSink>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("playback", &self.playback.is_some())
            .finish_non_exhaustive()
    }
}
