use std::time::{Duration, Instant};

/// A cancellable one-shot timer re-armed after every progress read.
#[derive(Debug, Clone)]
pub struct ProgressPoll {
    interval: Duration,
    due_at: Option<Instant>,
}

impl ProgressPoll {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            due_at: None,
        }
    }

    /// Arm the poll to fire one interval after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Instant) {
        self.due_at = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.due_at.is_some_and(|at| now >= at)
    }

    /// Time left until the poll fires, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due_at.map(|at| at.saturating_duration_since(now))
    }
}
