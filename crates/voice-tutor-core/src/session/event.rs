use crate::{SessionError, TimerId};

use std::fmt;

use uuid::Uuid;

/// Signals raised by a speech capture backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSignal {
    /// The backend is now listening.
    Started,
    /// Final transcript for the utterance; may be empty.
    Transcript(String),
    /// Listening stopped, with or without a transcript.
    Ended,
    /// The backend failed; a terminal error for the session.
    Failed(String),
}

/// Signals raised by a speech playback backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSignal {
    /// Audio output began.
    Started,
    /// Audio output finished or was interrupted.
    Ended,
    /// Playback failed.
    Failed(String),
}

/// Identifies one utterance handed to the playback backend.
///
/// Signals for an utterance other than the current one are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Work the controller can defer through a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Restart capture after a spontaneous end while listening.
    RestartCapture,
}

/// Everything that can drive the session state machine.
///
/// Backends, timers, and the completion task never touch session state
/// directly; they send one of these and the controller processes it to
/// completion before the next.
#[derive(Debug)]
pub enum SessionEvent {
    /// Signal from the speech capture backend.
    Capture(CaptureSignal),
    /// Signal from the playback backend for a specific utterance.
    Playback {
        /// Utterance the signal belongs to.
        id: UtteranceId,
        /// What happened.
        signal: PlaybackSignal,
    },
    /// Outcome of a completion request.
    Completion {
        /// Session that issued the request.
        session_id: Uuid,
        /// Reply text (`None` when the reply field was missing or empty) or the failure.
        outcome: Result<Option<String>, SessionError>,
    },
    /// A scheduled action came due.
    Timer {
        /// Timer that fired.
        id: TimerId,
        /// What was scheduled.
        action: ScheduledAction,
    },
}
