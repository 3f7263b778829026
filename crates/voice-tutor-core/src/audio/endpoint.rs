//! Energy-based end-of-utterance detection.
//!
//! Audio is scored in 10 ms frames by RMS level. An utterance starts at the
//! first loud frame and ends after a run of quiet frames; a listen with no
//! loud frame at all times out.

use std::time::Duration;

const FRAME: Duration = Duration::from_millis(10);

/// Thresholds for deciding when the learner has finished speaking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointConfig {
    /// RMS level (0.0 to 1.0) above which a frame counts as speech.
    pub speech_threshold: f32,
    /// Quiet time after speech that ends the utterance.
    pub trailing_silence: Duration,
    /// Time to wait for speech before giving up on this listen.
    pub no_speech_timeout: Duration,
    /// Hard cap on a single utterance.
    pub max_utterance: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            speech_threshold: 0.02,
            trailing_silence: Duration::from_millis(900),
            no_speech_timeout: Duration::from_secs(8),
            max_utterance: Duration::from_secs(60),
        }
    }
}

/// Result of feeding audio to the [`Endpointer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndpointDecision {
    /// No speech yet.
    Waiting,
    /// Speech in progress.
    Speaking,
    /// Speech followed by enough silence; transcribe now.
    Complete,
    /// Nothing was said before the timeout.
    NoSpeech,
}

pub(crate) struct Endpointer {
    config: EndpointConfig,
    frame_len: usize,
    pending: Vec<f32>,
    frames_seen: usize,
    quiet_run: usize,
    heard_speech: bool,
}

impl Endpointer {
    pub(crate) fn new(config: EndpointConfig, sample_rate: u32) -> Self {
        let frame_len = ((sample_rate as u128 * FRAME.as_millis()) / 1000).max(1) as usize;
        Self {
            config,
            frame_len,
            pending: Vec::with_capacity(frame_len),
            frames_seen: 0,
            quiet_run: 0,
            heard_speech: false,
        }
    }

    fn frames_for(duration: Duration) -> usize {
        (duration.as_millis() / FRAME.as_millis()).max(1) as usize
    }

    /// Score newly captured samples. Once `Complete` or `NoSpeech` is
    /// returned the listen is over and further input is irrelevant.
    pub(crate) fn feed(&mut self, samples: &[f32]) -> EndpointDecision {
        self.pending.extend_from_slice(samples);

        let whole = self.pending.len() / self.frame_len * self.frame_len;
        let frames: Vec<f32> = self.pending.drain(..whole).collect();

        for frame in frames.chunks(self.frame_len) {
            self.frames_seen += 1;

            if rms(frame) >= self.config.speech_threshold {
                self.heard_speech = true;
                self.quiet_run = 0;
            } else if self.heard_speech {
                self.quiet_run += 1;
            }

            if let Some(decision) = self.verdict() {
                return decision;
            }
        }

        if self.heard_speech {
            EndpointDecision::Speaking
        } else {
            EndpointDecision::Waiting
        }
    }

    fn verdict(&self) -> Option<EndpointDecision> {
        if self.heard_speech {
            let ended_on_silence = self.quiet_run >= Self::frames_for(self.config.trailing_silence);
            let too_long = self.frames_seen >= Self::frames_for(self.config.max_utterance);
            (ended_on_silence || too_long).then_some(EndpointDecision::Complete)
        } else {
            (self.frames_seen >= Self::frames_for(self.config.no_speech_timeout))
                .then_some(EndpointDecision::NoSpeech)
        }
    }
}

/// Root-mean-square level of a frame.
pub(crate) fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}
