use std::fmt;

/// Status line messages shown next to the toggle.
///
/// The four session states map to four distinct messages; the remaining
/// variants explain why a session is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    /// Idle and ready to start.
    Ready,
    /// Capture is running.
    Listening,
    /// The last capture produced no words.
    DidNotCatch,
    /// Waiting for the tutor's reply.
    Thinking,
    /// Reply playback in progress.
    Speaking,
    /// Neither capture nor playback is available, or capture could not be acquired.
    VoiceUnsupported,
    /// Playback works but there is no microphone capture.
    NoMicSupport,
    /// Capture failed mid-session.
    VoiceError,
    /// Capture refused to start.
    MicError,
    /// The completion service failed.
    TutorError,
    /// The user ended the session.
    Stopped,
}

impl StatusLabel {
    /// Human-readable text for the terminal front-end.
    pub fn text(self) -> &'static str {
        match self {
            StatusLabel::Ready => "Press Enter to start the tutor",
            StatusLabel::Listening => "Listening… press Enter to stop",
            StatusLabel::DidNotCatch => "Didn't catch that. Listening…",
            StatusLabel::Thinking => "Thinking…",
            StatusLabel::Speaking => "Speaking… press Enter to stop",
            StatusLabel::VoiceUnsupported => "Voice not supported on this system.",
            StatusLabel::NoMicSupport => "No mic support. Check your input device and speech model.",
            StatusLabel::VoiceError => "Voice error – press Enter to restart",
            StatusLabel::MicError => "Mic error – press Enter to restart",
            StatusLabel::TutorError => "Error talking to tutor – press Enter to start again",
            StatusLabel::Stopped => "Voice session stopped. Press Enter to start again",
        }
    }

    /// True for labels that report a failure or missing capability.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            StatusLabel::VoiceUnsupported
                | StatusLabel::NoMicSupport
                | StatusLabel::VoiceError
                | StatusLabel::MicError
                | StatusLabel::TutorError
        )
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
