//! Chooses the speech capture backend for this build.

use crate::config::Config;

#[cfg(feature = "local-stt")]
use crate::AppResult;

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::warn;
use voice_tutor_core::{CaptureBackend, CaptureProvider, SessionError, SessionEvent, SessionResult};

/// True when a voice session could start: a microphone exists and the
/// Whisper model is in place.
#[cfg(feature = "local-stt")]
pub fn capture_supported(config: &Config) -> bool {
    if !voice_tutor_core::input_device_available() {
        warn!("No microphone found, speech capture unsupported");
        return false;
    }
    if let Err(e) = config.validate_model_path() {
        warn!(error = %e, "Speech capture unsupported");
        return false;
    }
    true
}

#[cfg(not(feature = "local-stt"))]
pub fn capture_supported(_config: &Config) -> bool {
    warn!("Built without local speech recognition, speech capture unsupported");
    false
}

/// Provider matching the build features.
pub fn build_capture_provider(
    config: &Config,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Box<dyn CaptureProvider> {
    #[cfg(feature = "local-stt")]
    {
        Box::new(WhisperCaptureProvider::new(config, events))
    }
    #[cfg(not(feature = "local-stt"))]
    {
        let _ = (config, events);
        Box::new(UnsupportedCaptureProvider)
    }
}

/// Loads the Whisper recognizer the first time a session needs it.
#[cfg(feature = "local-stt")]
pub struct WhisperCaptureProvider {
    model_path: std::path::PathBuf,
    use_gpu: bool,
    endpointing: voice_tutor_core::EndpointConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
}

#[cfg(feature = "local-stt")]
impl WhisperCaptureProvider {
    pub fn new(config: &Config, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            model_path: config.whisper.model_path.clone(),
            use_gpu: config.whisper.use_gpu,
            endpointing: config.capture.endpoint_config(),
            events,
        }
    }

    fn load(&self) -> AppResult<voice_tutor_core::SpeechRecognizer> {
        let events = self.events.clone();
        let recognizer = voice_tutor_core::SpeechRecognizer::new(
            &self.model_path,
            self.use_gpu,
            self.endpointing,
            move |signal| {
                forward_capture_signal(&events, signal);
            },
        )?;
        Ok(recognizer)
    }
}

/// Post a recognizer signal to the event loop. Returns false once the loop is gone.
#[cfg(feature = "local-stt")]
pub(crate) fn forward_capture_signal(
    events: &mpsc::UnboundedSender<SessionEvent>,
    signal: voice_tutor_core::CaptureSignal,
) -> bool {
    if events.send(SessionEvent::Capture(signal)).is_err() {
        warn!("Event loop gone, capture signal dropped");
        return false;
    }
    true
}

#[cfg(feature = "local-stt")]
impl CaptureProvider for WhisperCaptureProvider {
    fn create(&mut self) -> SessionResult<Box<dyn CaptureBackend>> {
        match self.load() {
            Ok(recognizer) => Ok(Box::new(recognizer)),
            Err(e) => Err(SessionError::CaptureUnsupported {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Used when the binary is built without `local-stt`.
#[cfg(not(feature = "local-stt"))]
pub struct UnsupportedCaptureProvider;

#[cfg(not(feature = "local-stt"))]
impl CaptureProvider for UnsupportedCaptureProvider {
    fn create(&mut self) -> SessionResult<Box<dyn CaptureBackend>> {
        Err(SessionError::CaptureUnsupported {
            reason: "built without local speech recognition".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
