//! In-memory capability providers for driving the controller without audio.

use crate::{
    Backends, Capabilities, CaptureBackend, CaptureProvider, CaptureSignal, CompletionDispatcher,
    CompletionRequest, ControllerSettings, ManualScheduler, PlaybackBackend, PlaybackSignal,
    ScheduledAction, Scheduler, SessionError, SessionEvent, SessionResult, SessionState,
    StatusLabel, StatusSink, TimerId, UtteranceId, VoiceSessionController,
};

use std::{cell::RefCell, panic::Location, rc::Rc, time::Duration};

use error_location::ErrorLocation;
use uuid::Uuid;

/// Everything the fakes observed.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub provider_calls: usize,
    pub capture_starts: usize,
    pub capture_stops: usize,
    pub spoken: Vec<(UtteranceId, String)>,
    pub playback_cancels: usize,
    pub requests: Vec<CompletionRequest>,
    pub shown: Vec<(SessionState, StatusLabel)>,
}

type Shared = Rc<RefCell<Recorder>>;

struct FakeCapture {
    log: Shared,
    fail_start: bool,
}

impl CaptureBackend for FakeCapture {
    fn start(&mut self) -> SessionResult<()> {
        if self.fail_start {
            return Err(SessionError::CaptureStartError {
                reason: "device busy".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.log.borrow_mut().capture_starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.log.borrow_mut().capture_stops += 1;
    }
}

struct FakeCaptureProvider {
    log: Shared,
    fail_create: bool,
    fail_start: bool,
}

impl CaptureProvider for FakeCaptureProvider {
    fn create(&mut self) -> SessionResult<Box<dyn CaptureBackend>> {
        self.log.borrow_mut().provider_calls += 1;
        if self.fail_create {
            return Err(SessionError::CaptureUnsupported {
                reason: "no recognizer".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Box::new(FakeCapture {
            log: Rc::clone(&self.log),
            fail_start: self.fail_start,
        }))
    }
}

struct FakePlayback {
    log: Shared,
    refuse: bool,
}

impl PlaybackBackend for FakePlayback {
    fn speak(&mut self, id: UtteranceId, text: &str) -> Result<(), String> {
        if self.refuse {
            return Err("audio output unavailable".to_string());
        }
        self.log.borrow_mut().spoken.push((id, text.to_string()));
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.borrow_mut().playback_cancels += 1;
    }
}

struct FakeCompletion {
    log: Shared,
}

impl CompletionDispatcher for FakeCompletion {
    fn dispatch(&mut self, request: CompletionRequest) {
        self.log.borrow_mut().requests.push(request);
    }
}

struct FakeStatus {
    log: Shared,
}

impl StatusSink for FakeStatus {
    fn show(&mut self, state: SessionState, label: StatusLabel) {
        self.log.borrow_mut().shown.push((state, label));
    }
}

struct SharedScheduler(Rc<RefCell<ManualScheduler>>);

impl Scheduler for SharedScheduler {
    fn schedule(&mut self, delay: Duration, action: ScheduledAction) -> TimerId {
        self.0.borrow_mut().schedule(delay, action)
    }

    fn cancel(&mut self, id: TimerId) {
        self.0.borrow_mut().cancel(id);
    }
}

/// Knobs for building a [`Harness`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct HarnessOptions {
    pub capture_supported: bool,
    pub playback_supported: bool,
    pub provider_fails: bool,
    pub start_fails: bool,
    pub playback_refuses: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            capture_supported: true,
            playback_supported: true,
            provider_fails: false,
            start_fails: false,
            playback_refuses: false,
        }
    }
}

/// A controller wired to fakes, plus helpers to emit synthetic signals.
pub(crate) struct Harness {
    pub controller: VoiceSessionController,
    pub log: Shared,
    pub clock: Rc<RefCell<ManualScheduler>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(HarnessOptions::default())
    }

    pub fn with(options: HarnessOptions) -> Self {
        let log: Shared = Rc::default();
        let clock = Rc::new(RefCell::new(ManualScheduler::new()));

        let backends = Backends {
            capture: Box::new(FakeCaptureProvider {
                log: Rc::clone(&log),
                fail_create: options.provider_fails,
                fail_start: options.start_fails,
            }),
            playback: Some(Box::new(FakePlayback {
                log: Rc::clone(&log),
                refuse: options.playback_refuses,
            })),
            completion: Box::new(FakeCompletion {
                log: Rc::clone(&log),
            }),
            scheduler: Box::new(SharedScheduler(Rc::clone(&clock))),
            status: Box::new(FakeStatus {
                log: Rc::clone(&log),
            }),
        };

        let capabilities = Capabilities::new(options.capture_supported, options.playback_supported);
        let controller =
            VoiceSessionController::new(capabilities, backends, ControllerSettings::default());

        Self {
            controller,
            log,
            clock,
        }
    }

    pub fn capture(&mut self, signal: CaptureSignal) {
        self.controller.handle(SessionEvent::Capture(signal));
        self.assert_invariant();
    }

    pub fn transcript(&mut self, text: &str) {
        self.capture(CaptureSignal::Transcript(text.to_string()));
    }

    /// Toggle on and let the backend confirm it is listening.
    pub fn start_listening(&mut self) {
        self.controller.toggle();
        self.capture(CaptureSignal::Started);
    }

    pub fn last_session(&self) -> Uuid {
        self.log
            .borrow()
            .requests
            .last()
            .map(|r| r.session_id)
            .unwrap_or_else(Uuid::nil)
    }

    pub fn reply(&mut self, outcome: Result<Option<String>, SessionError>) {
        let session_id = self.last_session();
        self.reply_for(session_id, outcome);
    }

    pub fn reply_for(&mut self, session_id: Uuid, outcome: Result<Option<String>, SessionError>) {
        self.controller.handle(SessionEvent::Completion {
            session_id,
            outcome,
        });
        self.assert_invariant();
    }

    pub fn last_utterance(&self) -> UtteranceId {
        self.log
            .borrow()
            .spoken
            .last()
            .map(|(id, _)| *id)
            .unwrap_or(UtteranceId(0))
    }

    pub fn playback(&mut self, signal: PlaybackSignal) {
        let id = self.last_utterance();
        self.playback_for(id, signal);
    }

    pub fn playback_for(&mut self, id: UtteranceId, signal: PlaybackSignal) {
        self.controller.handle(SessionEvent::Playback { id, signal });
        self.assert_invariant();
    }

    pub fn advance(&mut self, by: Duration) {
        let due = self.clock.borrow_mut().advance(by);
        for (id, action) in due {
            self.controller.handle(SessionEvent::Timer { id, action });
            self.assert_invariant();
        }
    }

    /// Listening → Thinking → Speaking → Listening with the given texts.
    pub fn full_turn(&mut self, question: &str, answer: &str) {
        self.transcript(question);
        self.capture(CaptureSignal::Ended);
        self.reply(Ok(Some(answer.to_string())));
        self.playback(PlaybackSignal::Started);
        self.playback(PlaybackSignal::Ended);
        self.capture(CaptureSignal::Started);
    }

    pub fn captures_started(&self) -> usize {
        self.log.borrow().capture_starts
    }

    pub fn assert_invariant(&self) {
        assert_eq!(
            self.controller.state() == SessionState::Idle,
            !self.controller.is_active(),
            "state {} disagrees with active={}",
            self.controller.state(),
            self.controller.is_active()
        );
    }
}

pub(crate) fn request_error() -> SessionError {
    SessionError::CompletionRequestError {
        reason: "Request failed: 502".to_string(),
        status: Some(502),
        location: ErrorLocation::from(Location::caller()),
    }
}
