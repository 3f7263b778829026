use crate::{
    AudioError, CaptureBackend, CaptureSignal, CoreResult, SessionError, SessionResult,
    audio::{
        AudioCapturer, EndpointConfig, EndpointDecision, Endpointer, Resampler, SttEngine,
        WHISPER_SAMPLE_RATE, input_device_available,
    },
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// How often the listening worker drains the capture buffer.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type CaptureSink = Arc<dyn Fn(CaptureSignal) + Send + Sync>;

/// Desktop speech capture: microphone, silence end-pointing, and Whisper.
///
/// Each `start()` runs one listen on a worker thread. The worker reports
/// `Started`, then either a `Transcript` followed by `Ended`, a bare `Ended`
/// when nobody spoke, or `Failed` followed by `Ended`.
pub struct SpeechRecognizer {
    engine: Arc<Mutex<SttEngine>>,
    endpointing: EndpointConfig,
    sink: CaptureSink,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl SpeechRecognizer {
    /// Load the Whisper model and check that a microphone exists.
    ///
    /// # Errors
    ///
    /// Returns error if there is no input device or the model cannot be loaded.
    #[track_caller]
    #[instrument(skip(model_path, sink))]
    pub fn new<P, F>(
        model_path: P,
        use_gpu: bool,
        endpointing: EndpointConfig,
        sink: F,
    ) -> CoreResult<Self>
    where
        P: AsRef<Path>,
        F: Fn(CaptureSignal) + Send + Sync + 'static,
    {
        if !input_device_available() {
            return Err(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let engine = SttEngine::new(model_path, use_gpu)?;

        info!("SpeechRecognizer initialized");

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            endpointing,
            sink: Arc::new(sink),
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    fn is_listening(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl CaptureBackend for SpeechRecognizer {
    #[instrument(skip(self))]
    fn start(&mut self) -> SessionResult<()> {
        if self.is_listening() {
            debug!("Listen already in progress");
            return Ok(());
        }
        if let Some(finished) = self.worker.take() {
            reap_worker(finished);
        }

        self.stop = Arc::new(AtomicBool::new(false));
        let job = ListenJob {
            engine: Arc::clone(&self.engine),
            endpointing: self.endpointing,
            sink: Arc::clone(&self.sink),
            stop: Arc::clone(&self.stop),
        };

        let handle = thread::Builder::new()
            .name("speech-listen".to_string())
            .spawn(move || job.run())
            .map_err(|e| SessionError::CaptureStartError {
                reason: format!("Failed to spawn listening worker: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

impl Drop for SpeechRecognizer {
    fn drop(&mut self) {
        // The worker notices on its next poll; transcription in progress is not joined.
        self.stop.store(true, Ordering::Release);
    }
}

/// Join a finished listening worker. Returns false if it panicked.
pub(crate) fn reap_worker(worker: JoinHandle<()>) -> bool {
    if worker.join().is_err() {
        warn!("Previous listening worker panicked");
        return false;
    }
    true
}

struct ListenJob {
    engine: Arc<Mutex<SttEngine>>,
    endpointing: EndpointConfig,
    sink: CaptureSink,
    stop: Arc<AtomicBool>,
}

impl ListenJob {
    fn run(self) {
        match self.listen() {
            Ok(Some(text)) => {
                info!(text_len = text.len(), "Utterance transcribed");
                (self.sink)(CaptureSignal::Transcript(text));
            }
            Ok(None) => debug!("Listen ended without a transcript"),
            Err(e) => {
                error!(error = ?e, "Listening failed");
                (self.sink)(CaptureSignal::Failed(e.to_string()));
            }
        }
        (self.sink)(CaptureSignal::Ended);
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn listen(&self) -> CoreResult<Option<String>> {
        let mut capturer = AudioCapturer::new()?;
        let sample_rate = capturer.sample_rate();
        capturer.start()?;
        (self.sink)(CaptureSignal::Started);

        let mut endpointer = Endpointer::new(self.endpointing, sample_rate);
        let mut utterance = Vec::new();

        loop {
            thread::sleep(POLL_INTERVAL);

            if self.stop_requested() {
                capturer.stop()?;
                debug!("Listen stopped on request");
                return Ok(None);
            }

            let fresh = capturer.take_samples()?;
            utterance.extend_from_slice(&fresh);

            match endpointer.feed(&fresh) {
                EndpointDecision::Waiting | EndpointDecision::Speaking => continue,
                EndpointDecision::NoSpeech => {
                    capturer.stop()?;
                    debug!("No speech before timeout");
                    return Ok(None);
                }
                EndpointDecision::Complete => break,
            }
        }

        capturer.stop()?;
        debug!(
            sample_count = utterance.len(),
            sample_rate, "Utterance captured"
        );

        let samples = if sample_rate != WHISPER_SAMPLE_RATE {
            Resampler::for_whisper(sample_rate)?.resample(&utterance)?
        } else {
            utterance
        };

        let raw = {
            // A poisoned engine lock still guards a usable model.
            let mut engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
            engine.transcribe(&samples)?
        };

        if self.stop_requested() {
            return Ok(None);
        }

        Ok(Some(clean_transcript(&raw)))
    }
}

/// Strip Whisper's bracketed non-speech annotations (`[BLANK_AUDIO]`,
/// `(wind blowing)`) and normalise whitespace.
pub fn clean_transcript(raw: &str) -> String {
    let mut kept = String::with_capacity(raw.len());
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => kept.push(c),
            _ => {}
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
