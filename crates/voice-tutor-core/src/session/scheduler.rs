use crate::ScheduledAction;

use std::{fmt, time::Duration};

use tracing::debug;

/// Handle to a scheduled action, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Runs an action after a delay by delivering
/// [`SessionEvent::Timer`](crate::SessionEvent::Timer) back to the controller.
pub trait Scheduler {
    /// Arrange for `action` to fire after `delay`.
    fn schedule(&mut self, delay: Duration, action: ScheduledAction) -> TimerId;

    /// Drop a pending action. Unknown or already-fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy)]
struct PendingAction {
    id: TimerId,
    due: Duration,
    action: ScheduledAction,
}

/// Scheduler driven by logical time.
///
/// Nothing fires on its own. Call [`advance`](Self::advance) to move the
/// clock; the due actions come back in firing order for the caller to feed
/// into the controller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingAction>,
}

impl ManualScheduler {
    /// Scheduler at time zero with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of actions waiting to fire.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and return everything that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<(TimerId, ScheduledAction)> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<PendingAction> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| (p.due, p.id));

        due.into_iter().map(|p| (p.id, p.action)).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, action: ScheduledAction) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(PendingAction {
            id,
            due: self.now + delay,
            action,
        });
        debug!(timer = %id, delay_ms = delay.as_millis(), ?action, "Action scheduled");
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }
}
