use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};
use voice_tutor_core::{ScheduledAction, Scheduler, SessionEvent, TimerId};

/// Wall-clock [`Scheduler`]: each action is a sleeping task that posts a
/// [`SessionEvent::Timer`] back to the event loop.
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<SessionEvent>,
    next_id: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            timers: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, action: ScheduledAction) -> TimerId {
        self.timers.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(SessionEvent::Timer { id, action }).is_err() {
                warn!(timer = %id, "Event loop gone, timer dropped");
            }
        });

        debug!(timer = %id, delay_ms = delay.as_millis(), ?action, "Timer armed");
        self.timers.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.timers.remove(&id) {
            task.abort();
            debug!(timer = %id, "Timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.timers.values() {
            task.abort();
        }
    }
}
