mod capture_config;
mod completion_config;
#[allow(clippy::module_inception)]
mod config;
mod playback_config;
mod whisper_config;

pub(crate) use {
    capture_config::CaptureConfig, completion_config::CompletionConfig, config::Config,
    playback_config::PlaybackConfig, whisper_config::WhisperConfig,
};

pub(crate) const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/chat";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_RESTART_DELAY_MS: u64 = 200;
pub(crate) const DEFAULT_SPEECH_THRESHOLD: f32 = 0.02;
pub(crate) const DEFAULT_TRAILING_SILENCE_MS: u64 = 900;
pub(crate) const DEFAULT_NO_SPEECH_TIMEOUT_MS: u64 = 8_000;
pub(crate) const DEFAULT_SPEECH_RATE: f32 = 1.0;
pub(crate) const DEFAULT_LANGUAGE: &str = "en-US";

pub(crate) fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub(crate) fn default_restart_delay_ms() -> u64 {
    DEFAULT_RESTART_DELAY_MS
}

pub(crate) fn default_speech_threshold() -> f32 {
    DEFAULT_SPEECH_THRESHOLD
}

pub(crate) fn default_trailing_silence_ms() -> u64 {
    DEFAULT_TRAILING_SILENCE_MS
}

pub(crate) fn default_no_speech_timeout_ms() -> u64 {
    DEFAULT_NO_SPEECH_TIMEOUT_MS
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_speech_rate() -> f32 {
    DEFAULT_SPEECH_RATE
}

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
