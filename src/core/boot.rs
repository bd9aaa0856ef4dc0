//! Boot sequence
//!
//! Reveals the boot text one character per tick (starting from the empty
//! prefix), holds the finished text for a pause, then reports completion.

use std::time::Duration;

use super::scheduler::{Scheduler, TimerId, TimerKind};

pub const DEFAULT_BOOT_TEXT: &str = "Initializing system...
Loading kernel modules...
Booting Retro Terminal v1.0...

Ready.";

/// One step of the boot sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep<'a> {
    /// Run started; the boot cue should play now
    Started,
    /// `run` was called while a run was in flight; nothing changed
    AlreadyRunning,
    /// Boot screen should now show this prefix
    Prefix(&'a str),
    /// Pause after the full text elapsed
    Complete,
    /// Timer did not belong to the current run
    Stale,
}

#[derive(Debug)]
struct BootRun {
    /// Characters shown by the next tick
    next_len: usize,
    timer: TimerId,
    pausing: bool,
}

/// One-shot boot text reveal
#[derive(Debug)]
pub struct BootSequencer {
    text: String,
    char_count: usize,
    tick: Duration,
    pause: Duration,
    run: Option<BootRun>,
}

impl BootSequencer {
    pub fn new(text: impl Into<String>, tick: Duration, pause: Duration) -> Self {
        let text = text.into();
        Self {
            char_count: text.chars().count(),
            text,
            tick,
            pause,
            run: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Start the sequence
    pub fn run(&mut self, sched: &mut Scheduler) -> BootStep<'_> {
        if self.run.is_some() {
            return BootStep::AlreadyRunning;
        }
        self.run = Some(BootRun {
            next_len: 0,
            timer: sched.schedule(self.tick, TimerKind::Boot),
            pausing: false,
        });
        BootStep::Started
    }

    /// Handle a boot timer
    pub fn on_timer(&mut self, id: TimerId, sched: &mut Scheduler) -> BootStep<'_> {
        let run = match self.run.as_mut() {
            Some(run) if run.timer == id => run,
            _ => return BootStep::Stale,
        };

        if run.pausing {
            self.run = None;
            return BootStep::Complete;
        }

        let len = run.next_len;
        run.next_len += 1;
        if run.next_len > self.char_count {
            run.pausing = true;
            run.timer = sched.schedule(self.pause, TimerKind::Boot);
        } else {
            run.timer = sched.schedule(self.tick, TimerKind::Boot);
        }

        let end = self
            .text
            .char_indices()
            .nth(len)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        BootStep::Prefix(&self.text[..end])
    }

    pub fn cancel(&mut self, sched: &mut Scheduler) {
        if let Some(run) = self.run.take() {
            sched.cancel(run.timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn collect(boot: &mut BootSequencer, sched: &mut Scheduler) -> (Vec<String>, Duration) {
        let mut prefixes = Vec::new();
        while let Some((id, kind)) = sched.pop_due(ms(60_000)) {
            assert_eq!(kind, TimerKind::Boot);
            match boot.on_timer(id, sched) {
                BootStep::Prefix(text) => prefixes.push(text.to_string()),
                BootStep::Complete => return (prefixes, sched.now()),
                other => panic!("unexpected step {:?}", other),
            }
        }
        panic!("boot never completed");
    }

    #[test]
    fn test_reveals_every_prefix_then_pauses() {
        let mut sched = Scheduler::new();
        let mut boot = BootSequencer::new("OK.", ms(40), ms(800));

        assert_eq!(boot.run(&mut sched), BootStep::Started);
        let (prefixes, done_at) = collect(&mut boot, &mut sched);

        assert_eq!(prefixes, vec!["", "O", "OK", "OK."]);
        // Four ticks, then the pause
        assert_eq!(done_at, ms(4 * 40 + 800));
        assert!(!boot.is_running());
    }

    #[test]
    fn test_multibyte_prefixes() {
        let mut sched = Scheduler::new();
        let mut boot = BootSequencer::new("é→", ms(1), ms(1));
        boot.run(&mut sched);

        let (prefixes, _) = collect(&mut boot, &mut sched);
        assert_eq!(prefixes, vec!["", "é", "é→"]);
    }

    #[test]
    fn test_default_text_ends_ready() {
        let mut sched = Scheduler::new();
        let mut boot = BootSequencer::new(DEFAULT_BOOT_TEXT, ms(40), ms(800));
        boot.run(&mut sched);

        let (prefixes, _) = collect(&mut boot, &mut sched);
        assert_eq!(prefixes.len(), DEFAULT_BOOT_TEXT.chars().count() + 1);
        assert_eq!(prefixes.last().map(String::as_str), Some(DEFAULT_BOOT_TEXT));
    }

    #[test]
    fn test_second_run_rejected_while_running() {
        let mut sched = Scheduler::new();
        let mut boot = BootSequencer::new("abc", ms(40), ms(800));

        boot.run(&mut sched);
        assert_eq!(boot.run(&mut sched), BootStep::AlreadyRunning);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel_and_restart() {
        let mut sched = Scheduler::new();
        let mut boot = BootSequencer::new("abc", ms(40), ms(800));

        boot.run(&mut sched);
        let (id, _) = sched.pop_due(ms(40)).unwrap();
        boot.on_timer(id, &mut sched);
        boot.cancel(&mut sched);
        assert_eq!(sched.pending(), 0);

        assert_eq!(boot.run(&mut sched), BootStep::Started);
        let (prefixes, _) = collect(&mut boot, &mut sched);
        assert_eq!(prefixes[0], "");
    }
}
