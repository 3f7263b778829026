use crate::{AudioError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Maximum mono samples to buffer (5 minutes at 48kHz).
/// Oldest samples are dropped beyond this.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// True when the default host exposes an input device.
pub fn input_device_available() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Average interleaved frames down to mono.
pub(crate) fn downmix(data: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    let channels = channels.max(1);
    data.chunks(channels)
        .map(move |frame| frame.iter().sum::<f32>() / frame.len() as f32)
}

/// Microphone stream feeding a bounded mono sample buffer.
///
/// Owned by a single listening worker; the stream is opened in `start` and
/// closed in `stop`.
pub(crate) struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    #[track_caller]
    #[instrument]
    pub(crate) fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    #[track_caller]
    #[instrument(skip(self))]
    pub(crate) fn start(&mut self) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let channels = self.config.channels as usize;

        self.shutdown.store(false, Ordering::Release);

        samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned buffer still holds valid samples.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(downmix(data, channels));
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Remove and return everything captured since the last call.
    #[track_caller]
    pub(crate) fn take_samples(&self) -> CoreResult<Vec<f32>> {
        let mut buf = self.samples.lock().map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to lock samples: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(buf.drain(..).collect())
    }

    /// Close the stream and return any samples not yet taken.
    #[track_caller]
    #[instrument(skip(self))]
    pub(crate) fn stop(&mut self) -> CoreResult<Vec<f32>> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Let an in-flight callback observe the shutdown flag.
            std::thread::sleep(std::time::Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples = self.take_samples()?;
        debug!(sample_count = samples.len(), "Remaining audio samples");

        Ok(samples)
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}
