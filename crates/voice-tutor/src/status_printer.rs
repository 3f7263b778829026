use std::io::Write;

use tracing::warn;
use voice_tutor_core::{SessionState, StatusLabel, StatusSink};

/// Prints one line per status change.
pub struct TerminalStatus<W: Write> {
    out: W,
    last: Option<(SessionState, StatusLabel)>,
}

impl<W: Write> TerminalStatus<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }
}

impl<W: Write> StatusSink for TerminalStatus<W> {
    fn show(&mut self, state: SessionState, label: StatusLabel) {
        if self.last == Some((state, label)) {
            return;
        }
        self.last = Some((state, label));

        let marker = if label.is_error() { "!" } else { "*" };
        if let Err(e) = writeln!(self.out, "{} [{}] {}", marker, state, label.text())
            .and_then(|()| self.out.flush())
        {
            warn!(error = ?e, "Failed to print status");
        }
    }
}
