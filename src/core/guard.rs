//! Inactivity timeout

use std::time::Duration;

use super::scheduler::{Scheduler, TimerId, TimerKind};

/// Rearmable inactivity timer
#[derive(Debug, Default)]
pub struct InactivityGuard {
    timeout: Duration,
    timer: Option<TimerId>,
}

impl InactivityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Start (or restart) the countdown with a new window
    pub fn arm(&mut self, timeout: Duration, sched: &mut Scheduler) {
        self.disarm(sched);
        self.timeout = timeout;
        self.timer = Some(sched.schedule(timeout, TimerKind::Inactivity));
    }

    /// Restart the countdown at full length. No-op while disarmed.
    pub fn rearm(&mut self, sched: &mut Scheduler) {
        if let Some(timer) = self.timer.take() {
            sched.cancel(timer);
            self.timer = Some(sched.schedule(self.timeout, TimerKind::Inactivity));
        }
    }

    pub fn disarm(&mut self, sched: &mut Scheduler) {
        if let Some(timer) = self.timer.take() {
            sched.cancel(timer);
        }
    }

    /// Returns true if `id` is the live timeout. The guard disarms itself, so
    /// each arm/rearm cycle fires at most once.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            true
        } else {
            false
        }
    }
}
