use crate::{PlaybackBackend, UtteranceId};

use tracing::{debug, warn};

/// Controller-side wrapper around the playback backend.
///
/// At most one utterance is current. Starting a new one cancels the old
/// one first, and signals for anything but the current utterance are stale.
pub(crate) struct PlaybackHandle {
    backend: Option<Box<dyn PlaybackBackend>>,
    current: Option<UtteranceId>,
    next_id: u64,
}

impl PlaybackHandle {
    pub(crate) fn new(backend: Option<Box<dyn PlaybackBackend>>) -> Self {
        Self {
            backend,
            current: None,
            next_id: 0,
        }
    }

    pub(crate) fn is_current(&self, id: UtteranceId) -> bool {
        self.current == Some(id)
    }

    /// Speak `text`.
    ///
    /// Returns `None` when nothing will play (no backend, blank text, or the
    /// backend refused), so the caller can carry on as if playback ended.
    pub(crate) fn speak(&mut self, text: &str) -> Option<UtteranceId> {
        if text.trim().is_empty() {
            debug!("Nothing to speak");
            return None;
        }

        self.cancel();
        let backend = self.backend.as_mut()?;

        self.next_id += 1;
        let id = UtteranceId(self.next_id);

        match backend.speak(id, text) {
            Ok(()) => {
                self.current = Some(id);
                debug!(utterance = %id, text_len = text.len(), "Utterance queued");
                Some(id)
            }
            Err(reason) => {
                warn!(utterance = %id, %reason, "Playback could not start");
                None
            }
        }
    }

    /// Silence the current utterance, if any. Its later signals become stale.
    pub(crate) fn cancel(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.cancel();
        }
        if let Some(id) = self.current.take() {
            debug!(utterance = %id, "Utterance cancelled");
        }
    }

    /// Mark `id` as finished.
    pub(crate) fn finish(&mut self, id: UtteranceId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }
}
