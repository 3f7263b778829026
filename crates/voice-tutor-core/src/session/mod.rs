mod capabilities;
mod capture_handle;
mod controller;
mod event;
mod history;
mod label;
mod playback;
mod scheduler;
mod state;

pub(crate) use {capture_handle::CaptureHandle, playback::PlaybackHandle};

pub use {
    capabilities::{
        Backends, Capabilities, CaptureBackend, CaptureProvider, CompletionDispatcher,
        CompletionRequest, PlaybackBackend, StatusSink,
    },
    controller::{
        ControllerSettings, DEFAULT_FALLBACK_REPLY, DEFAULT_RESTART_DELAY, VoiceSessionController,
    },
    event::{CaptureSignal, PlaybackSignal, ScheduledAction, SessionEvent, UtteranceId},
    history::{History, Role, Turn},
    label::StatusLabel,
    scheduler::{ManualScheduler, Scheduler, TimerId},
    state::SessionState,
};
