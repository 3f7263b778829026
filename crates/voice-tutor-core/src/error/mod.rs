use crate::StatusLabel;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures that terminate a voice session.
///
/// Every variant carries the `ErrorLocation` where it was raised. None of
/// these is retried; the session is forced to Idle and the user restarts.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The platform has no usable speech capture.
    #[error("Speech capture unsupported: {reason} {location}")]
    CaptureUnsupported {
        /// Why capture could not be acquired.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture refused to start.
    #[error("Speech capture failed to start: {reason} {location}")]
    CaptureStartError {
        /// Description of the start failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture failed while a session was listening.
    #[error("Speech capture error: {reason} {location}")]
    CaptureRuntimeError {
        /// Description reported by the capture backend.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Network failure or non-2xx response from the completion service.
    #[error("Completion request failed: {reason} {location}")]
    CompletionRequestError {
        /// Service-provided error text, or a generic status message.
        reason: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The completion service answered with a payload that could not be read.
    #[error("Completion reply malformed: {reason} {location}")]
    CompletionParseError {
        /// Description of the decode failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl SessionError {
    /// Status label shown when this error ends a session.
    pub fn label(&self) -> StatusLabel {
        match self {
            SessionError::CaptureUnsupported { .. } => StatusLabel::VoiceUnsupported,
            SessionError::CaptureStartError { .. } => StatusLabel::MicError,
            SessionError::CaptureRuntimeError { .. } => StatusLabel::VoiceError,
            SessionError::CompletionRequestError { .. }
            | SessionError::CompletionParseError { .. } => StatusLabel::TutorError,
        }
    }
}

/// Audio processing errors with source location tracking.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`AudioError`].
pub type Result<T> = std::result::Result<T, AudioError>;

/// Result type alias using [`SessionError`].
pub type SessionResult<T> = std::result::Result<T, SessionError>;
