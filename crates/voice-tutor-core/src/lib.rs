//! Voice-tutor Core Library
//!
//! Voice session state machine for a spoken tutoring loop: listen, ask the
//! completion service, speak the reply, listen again. The controller reacts
//! to capability signals delivered as [`SessionEvent`]s and never blocks.
//!
//! With the `local-stt` feature the crate also ships a desktop speech
//! recognizer built on CPAL, Rubato, and Whisper.
//!
//! # Example
//!
//! ```no_run
//! use voice_tutor_core::{
//!     Backends, Capabilities, ControllerSettings, ManualScheduler, SessionEvent,
//!     VoiceSessionController,
//! };
//!
//! fn drive(backends: Backends, events: Vec<SessionEvent>) {
//!     let capabilities = Capabilities::new(true, true);
//!     let mut controller =
//!         VoiceSessionController::new(capabilities, backends, ControllerSettings::default());
//!
//!     controller.toggle();
//!     for event in events {
//!         controller.handle(event);
//!     }
//!     println!("state: {}", controller.state());
//! }
//! # let _ = ManualScheduler::new();
//! ```

#[cfg(feature = "local-stt")]
mod audio;
mod error;
mod session;

#[cfg(feature = "local-stt")]
pub use audio::{EndpointConfig, SpeechRecognizer, clean_transcript, input_device_available};

pub use {
    error::{AudioError, Result as CoreResult, SessionError, SessionResult},
    session::{
        Backends, Capabilities, CaptureBackend, CaptureProvider, CaptureSignal,
        CompletionDispatcher, CompletionRequest, ControllerSettings, DEFAULT_FALLBACK_REPLY,
        DEFAULT_RESTART_DELAY, History, ManualScheduler, PlaybackBackend, PlaybackSignal, Role,
        ScheduledAction, Scheduler, SessionEvent, SessionState, StatusLabel, StatusSink, TimerId,
        Turn, UtteranceId, VoiceSessionController,
    },
};
