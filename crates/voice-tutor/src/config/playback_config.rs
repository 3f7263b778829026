use crate::config::{default_language, default_speech_rate, default_true};

use serde::{Deserialize, Serialize};

/// Spoken reply configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speak tutor replies aloud.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Override program that reads the reply text on stdin.
    /// None = the platform's own synthesizer.
    #[serde(default)]
    pub command: Option<String>,

    /// Speaking rate relative to the platform default.
    #[serde(default = "default_speech_rate")]
    pub rate: f32,

    /// Voice language tag.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            rate: default_speech_rate(),
            language: default_language(),
        }
    }
}
