use crate::config::{
    default_no_speech_timeout_ms, default_restart_delay_ms, default_speech_threshold,
    default_trailing_silence_ms,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Listening behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Pause before listening again after a silent listen ends.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// RMS level (0.0 to 1.0) that counts as speech.
    #[serde(default = "default_speech_threshold")]
    pub speech_threshold: f32,

    /// Quiet time that ends an utterance.
    #[serde(default = "default_trailing_silence_ms")]
    pub trailing_silence_ms: u64,

    /// How long one listen waits for the learner to start speaking.
    #[serde(default = "default_no_speech_timeout_ms")]
    pub no_speech_timeout_ms: u64,
}

impl CaptureConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    #[cfg(feature = "local-stt")]
    pub fn endpoint_config(&self) -> voice_tutor_core::EndpointConfig {
        voice_tutor_core::EndpointConfig {
            speech_threshold: self.speech_threshold,
            trailing_silence: Duration::from_millis(self.trailing_silence_ms),
            no_speech_timeout: Duration::from_millis(self.no_speech_timeout_ms),
            ..voice_tutor_core::EndpointConfig::default()
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
            speech_threshold: default_speech_threshold(),
            trailing_silence_ms: default_trailing_silence_ms(),
            no_speech_timeout_ms: default_no_speech_timeout_ms(),
        }
    }
}
