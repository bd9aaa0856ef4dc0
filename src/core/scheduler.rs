//! Timer service
//!
//! A virtual clock plus an ordered set of one-shot timers. Nothing fires on
//! its own: the host moves the clock with `pop_due`, and every component keeps
//! the `TimerId` of what it scheduled so it can cancel it.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer was scheduled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Boot text tick or the pause after it
    Boot,
    /// Sweep end or per-character reveal
    Animation,
    /// Pending transcript wipe
    Wipe,
    /// Inactivity timeout
    Inactivity,
}

/// Single-threaded timer queue on a virtual clock
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Current virtual time (elapsed since session start)
    now: Duration,
    /// Pending timers ordered by deadline, then by scheduling order
    queue: BTreeMap<(Duration, TimerId), TimerKind>,
    /// Deadline lookup for cancellation
    deadlines: HashMap<TimerId, Duration>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a one-shot timer `delay` after the current time
    pub fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Whether the timer is still pending
    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of pending timers
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock jumps to the timer's deadline so that anything scheduled by
    /// its handler is measured from when it was due, not from `until`. When
    /// nothing is due the clock moves to `until` (never backwards).
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerKind)> {
        let due = match self.queue.keys().next() {
            Some(&(deadline, id)) if deadline <= until => (deadline, id),
            _ => {
                self.now = self.now.max(until);
                return None;
            }
        };
        let kind = self.queue.remove(&due)?;
        self.deadlines.remove(&due.1);
        self.now = self.now.max(due.0);
        Some((due.1, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut sched = Scheduler::new();
        let late = sched.schedule(ms(30), TimerKind::Wipe);
        let early = sched.schedule(ms(10), TimerKind::Animation);

        assert_eq!(sched.next_deadline(), Some(ms(10)));
        assert_eq!(sched.pop_due(ms(50)), Some((early, TimerKind::Animation)));
        assert_eq!(sched.now(), ms(10));
        assert_eq!(sched.pop_due(ms(50)), Some((late, TimerKind::Wipe)));
        assert_eq!(sched.pop_due(ms(50)), None);
        assert_eq!(sched.now(), ms(50));
    }

    #[test]
    fn test_same_deadline_keeps_scheduling_order() {
        let mut sched = Scheduler::new();
        let first = sched.schedule(ms(5), TimerKind::Inactivity);
        let second = sched.schedule(ms(5), TimerKind::Boot);

        assert_eq!(sched.pop_due(ms(5)).map(|(id, _)| id), Some(first));
        assert_eq!(sched.pop_due(ms(5)).map(|(id, _)| id), Some(second));
    }

    #[test]
    fn test_not_due_yet() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(100), TimerKind::Inactivity);

        assert_eq!(sched.pop_due(ms(99)), None);
        assert_eq!(sched.now(), ms(99));
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let a = sched.schedule(ms(10), TimerKind::Animation);
        let b = sched.schedule(ms(20), TimerKind::Inactivity);

        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert!(!sched.is_pending(a));
        assert!(sched.is_pending(b));
        assert_eq!(sched.pop_due(ms(100)), Some((b, TimerKind::Inactivity)));
        assert!(!sched.cancel(b));
    }

    #[test]
    fn test_schedule_relative_to_fired_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(10), TimerKind::Animation);

        // Handler runs at t=10 even though the host asked for t=100
        assert!(sched.pop_due(ms(100)).is_some());
        sched.schedule(ms(10), TimerKind::Animation);
        assert_eq!(sched.next_deadline(), Some(ms(20)));
    }
}
