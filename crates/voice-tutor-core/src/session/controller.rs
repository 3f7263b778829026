//! Voice session state machine.
//!
//! One controller owns the one session. Every change to `state`, `active`,
//! or `history` happens inside a controller method, and every asynchronous
//! signal enters through [`VoiceSessionController::handle`].

use crate::{
    Backends, Capabilities, CaptureProvider, CaptureSignal, CompletionDispatcher,
    CompletionRequest, History, PlaybackSignal, ScheduledAction, Scheduler, SessionError,
    SessionEvent, SessionState, StatusLabel, StatusSink, TimerId, UtteranceId,
    session::{CaptureHandle, PlaybackHandle},
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Delay before restarting capture after it ends on silence.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(200);

/// Spoken when the completion service returns no reply text.
pub const DEFAULT_FALLBACK_REPLY: &str =
    "I couldn't come up with a response. Please try asking again.";

/// Tunables for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Wait between a spontaneous capture end and the next capture start.
    pub restart_delay: Duration,
    /// Reply substituted for an empty or missing completion.
    pub fallback_reply: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            restart_delay: DEFAULT_RESTART_DELAY,
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    id: Uuid,
    active: bool,
    history: History,
    state: SessionState,
}

/// Coordinates capture, completion, and playback for one voice conversation
/// at a time.
pub struct VoiceSessionController {
    settings: ControllerSettings,
    capabilities: Capabilities,
    session: Session,
    label: StatusLabel,
    last_error: Option<SessionError>,
    capture_provider: Box<dyn CaptureProvider>,
    capture: Option<CaptureHandle>,
    playback: PlaybackHandle,
    completion: Box<dyn CompletionDispatcher>,
    scheduler: Box<dyn Scheduler>,
    status: Box<dyn StatusSink>,
    pending_restart: Option<TimerId>,
}

impl VoiceSessionController {
    /// Create an idle controller and display the startup label.
    #[instrument(skip(backends, settings))]
    pub fn new(
        capabilities: Capabilities,
        backends: Backends,
        settings: ControllerSettings,
    ) -> Self {
        let playback = backends
            .playback
            .filter(|_| capabilities.playback_supported);

        let mut controller = Self {
            settings,
            capabilities,
            session: Session::default(),
            label: capabilities.initial_label(),
            last_error: None,
            capture_provider: backends.capture,
            capture: None,
            playback: PlaybackHandle::new(playback),
            completion: backends.completion,
            scheduler: backends.scheduler,
            status: backends.status,
            pending_restart: None,
        };

        let label = controller.label;
        controller.set_state(SessionState::Idle, Some(label));
        info!(
            capture_supported = capabilities.capture_supported,
            playback_supported = capabilities.playback_supported,
            "Voice session controller ready"
        );

        controller
    }

    /// Current mode.
    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// True while a session is running.
    pub fn is_active(&self) -> bool {
        self.session.active
    }

    /// Conversation of the current (or most recently stopped) session.
    pub fn history(&self) -> &History {
        &self.session.history
    }

    /// Id of the current (or most recently stopped) session.
    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    /// Label currently displayed.
    pub fn label(&self) -> StatusLabel {
        self.label
    }

    /// Error that ended the last session, if it ended with one.
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// True while the capture backend reports it is listening.
    pub fn is_capturing(&self) -> bool {
        self.capture.as_ref().is_some_and(CaptureHandle::is_running)
    }

    /// The single user control: start a session when idle, stop it otherwise.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub fn toggle(&mut self) {
        if self.session.active {
            info!("Session stopped by user");
            self.stop_session(StatusLabel::Stopped);
        } else {
            self.start_session();
        }
    }

    /// Begin a new session with an empty history.
    #[instrument(skip(self))]
    pub fn start_session(&mut self) {
        if !self.capabilities.capture_supported {
            warn!("Voice session requested but speech capture is unsupported");
            self.set_state(SessionState::Idle, Some(StatusLabel::VoiceUnsupported));
            return;
        }

        self.session = Session {
            id: Uuid::new_v4(),
            active: true,
            history: History::new(),
            state: self.session.state,
        };
        self.last_error = None;
        self.playback.cancel();

        info!(session_id = %self.session.id, "Voice session started");

        self.set_state(SessionState::Listening, Some(StatusLabel::Listening));
        self.start_listening();
    }

    /// End the session immediately from any state.
    ///
    /// Cancels playback, asks capture to stop, clears `active`, and forces
    /// Idle in one call, so no signal can observe a half-stopped session.
    /// An in-flight completion is not cancelled; its outcome is discarded
    /// when it arrives.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub fn stop_session(&mut self, label: StatusLabel) {
        self.session.active = false;

        if let Some(capture) = self.capture.as_mut() {
            capture.stop();
        }
        self.playback.cancel();

        self.set_state(SessionState::Idle, Some(label));
        debug!(history_len = self.session.history.len(), "Session torn down");
    }

    /// Stop any session and drop the pending restart; used on process exit.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        if self.session.active {
            self.stop_session(StatusLabel::Stopped);
        }
        if let Some(id) = self.pending_restart.take() {
            self.scheduler.cancel(id);
        }
        info!("Voice session controller shut down");
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Capture(signal) => self.on_capture(signal),
            SessionEvent::Playback { id, signal } => self.on_playback(id, signal),
            SessionEvent::Completion {
                session_id,
                outcome,
            } => self.on_completion(session_id, outcome),
            SessionEvent::Timer { id, action } => self.on_timer(id, action),
        }
    }

    #[instrument(skip(self, signal), fields(session_id = %self.session.id, state = %self.session.state))]
    fn on_capture(&mut self, signal: CaptureSignal) {
        match signal {
            CaptureSignal::Started => {
                if let Some(capture) = self.capture.as_mut() {
                    capture.on_started();
                    if !self.session.active {
                        debug!("Capture started after the session stopped, stopping it");
                        capture.stop();
                    }
                }
                if self.session.active {
                    self.set_state(SessionState::Listening, Some(StatusLabel::Listening));
                }
            }
            CaptureSignal::Ended => {
                if let Some(capture) = self.capture.as_mut() {
                    capture.on_ended();
                }
                if self.session.active && self.session.state == SessionState::Listening {
                    self.schedule_restart();
                } else if !self.session.active && !self.session.state.is_idle() {
                    self.set_state(SessionState::Idle, Some(StatusLabel::Ready));
                }
            }
            CaptureSignal::Failed(reason) => {
                error!(%reason, "Speech capture error");
                if self.session.active {
                    self.fail_session(SessionError::CaptureRuntimeError {
                        reason,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
            CaptureSignal::Transcript(text) => self.on_transcript(text),
        }
    }

    fn on_transcript(&mut self, text: String) {
        if !self.session.active || self.session.state != SessionState::Listening {
            debug!("Transcript outside an active listening turn, discarded");
            return;
        }

        let text = text.trim();
        if text.is_empty() {
            debug!("Empty transcript, listening again");
            self.set_state(SessionState::Listening, Some(StatusLabel::DidNotCatch));
            self.start_listening();
            return;
        }

        info!(text_len = text.len(), "Transcript received");
        self.session.history.push_user(text);
        self.ask_completion();
    }

    fn ask_completion(&mut self) {
        if !self.session.active {
            return;
        }
        self.set_state(SessionState::Thinking, Some(StatusLabel::Thinking));

        let request = CompletionRequest {
            session_id: self.session.id,
            messages: self.session.history.to_vec(),
        };
        debug!(message_count = request.messages.len(), "Completion requested");
        self.completion.dispatch(request);
    }

    #[instrument(skip(self, outcome), fields(current_session = %self.session.id))]
    fn on_completion(&mut self, session_id: Uuid, outcome: Result<Option<String>, SessionError>) {
        if !self.session.active
            || session_id != self.session.id
            || self.session.state != SessionState::Thinking
        {
            debug!(
                %session_id,
                active = self.session.active,
                state = %self.session.state,
                "Late completion discarded"
            );
            return;
        }

        match outcome {
            Ok(reply) => {
                let reply = reply
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| {
                        warn!("Completion returned no reply, using fallback");
                        self.settings.fallback_reply.clone()
                    });

                info!(reply_len = reply.len(), "Tutor reply received");
                self.session.history.push_assistant(reply.as_str());
                self.speak(&reply);
            }
            Err(e) => {
                error!(error = %e, "Completion request failed");
                self.fail_session(e);
            }
        }
    }

    fn speak(&mut self, text: &str) {
        match self.playback.speak(text) {
            Some(id) => {
                debug!(utterance = %id, "Speaking reply");
                self.set_state(SessionState::Speaking, Some(StatusLabel::Speaking));
            }
            None => self.resume_after_playback(),
        }
    }

    #[instrument(skip(self), fields(session_id = %self.session.id))]
    fn on_playback(&mut self, id: UtteranceId, signal: PlaybackSignal) {
        if !self.playback.is_current(id) {
            debug!(utterance = %id, ?signal, "Stale playback signal ignored");
            return;
        }

        match signal {
            PlaybackSignal::Started => {
                if self.session.active {
                    self.set_state(SessionState::Speaking, Some(StatusLabel::Speaking));
                }
            }
            PlaybackSignal::Ended => {
                self.playback.finish(id);
                self.resume_after_playback();
            }
            PlaybackSignal::Failed(reason) => {
                warn!(utterance = %id, %reason, "Playback failed");
                self.playback.finish(id);
                self.resume_after_playback();
            }
        }
    }

    /// Back to listening after the reply, or to Idle if the session ended meanwhile.
    fn resume_after_playback(&mut self) {
        if self.session.active {
            self.set_state(SessionState::Listening, Some(StatusLabel::Listening));
            self.start_listening();
        } else {
            self.set_state(SessionState::Idle, Some(StatusLabel::Ready));
        }
    }

    fn on_timer(&mut self, id: TimerId, action: ScheduledAction) {
        if self.pending_restart == Some(id) {
            self.pending_restart = None;
        }

        match action {
            ScheduledAction::RestartCapture => {
                // Only guard: the session must still be active and idle on the mic.
                if self.session.active && !self.is_capturing() {
                    debug!(timer = %id, "Restarting capture after silence");
                    self.start_listening();
                } else {
                    debug!(timer = %id, "Capture restart skipped");
                }
            }
        }
    }

    fn schedule_restart(&mut self) {
        if let Some(previous) = self.pending_restart.take() {
            self.scheduler.cancel(previous);
        }
        let id = self
            .scheduler
            .schedule(self.settings.restart_delay, ScheduledAction::RestartCapture);
        self.pending_restart = Some(id);
    }

    /// Request capture for the active session, creating the backend on first use.
    fn start_listening(&mut self) {
        if !self.session.active {
            return;
        }

        if self.capture.is_none() {
            match self.capture_provider.create() {
                Ok(backend) => {
                    debug!("Capture backend created");
                    self.capture = Some(CaptureHandle::new(backend));
                }
                Err(e) => {
                    error!(error = %e, "Speech capture unavailable");
                    self.fail_session(e);
                    return;
                }
            }
        }

        let Some(capture) = self.capture.as_mut() else {
            return;
        };

        if let Err(e) = capture.start() {
            error!(error = %e, "Speech capture failed to start");
            self.fail_session(e);
        }
    }

    fn fail_session(&mut self, error: SessionError) {
        let label = error.label();
        self.last_error = Some(error);
        self.stop_session(label);
    }

    fn set_state(&mut self, state: SessionState, label: Option<StatusLabel>) {
        let previous = self.session.state;
        self.session.state = state;
        if let Some(label) = label {
            self.label = label;
        }

        if previous != state {
            debug!(from = %previous, to = %state, "State changed");
        }
        self.status.show(state, self.label);
    }
}

impl std::fmt::Debug for VoiceSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSessionController")
            .field("session", &self.session)
            .field("label", &self.label)
            .field("capabilities", &self.capabilities)
            .field("pending_restart", &self.pending_restart)
            .finish_non_exhaustive()
    }
}
