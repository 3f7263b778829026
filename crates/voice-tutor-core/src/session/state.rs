use std::fmt;

/// The controller's single externally observable mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session, or a session that has just been torn down.
    #[default]
    Idle,
    /// Waiting for the user to speak.
    Listening,
    /// Waiting for the completion service.
    Thinking,
    /// Reading the tutor's reply aloud.
    Speaking,
}

impl SessionState {
    /// True when no session activity is in progress.
    pub fn is_idle(self) -> bool {
        self == SessionState::Idle
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Listening => "listening",
            SessionState::Thinking => "thinking",
            SessionState::Speaking => "speaking",
        };
        f.write_str(name)
    }
}
