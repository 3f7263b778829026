pub(crate) mod capture;
pub(crate) mod endpoint;
mod engine;
pub(crate) mod recognizer;
mod resampler;

pub(crate) use {
    capture::AudioCapturer,
    endpoint::{EndpointDecision, Endpointer},
    engine::SttEngine,
    resampler::Resampler,
};

pub use {
    capture::input_device_available,
    endpoint::EndpointConfig,
    recognizer::{SpeechRecognizer, clean_transcript},
};

/// Sample rate Whisper expects.
pub(crate) const WHISPER_SAMPLE_RATE: u32 = 16_000;
