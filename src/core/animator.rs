//! Typewriter reveal of a response
//!
//! A run optionally starts with a sweep (a fixed-length placeholder phase),
//! then reveals one character per interval, then reports `Done` one interval
//! after the last character. Only one run exists at a time.

use std::time::Duration;

use thiserror::Error;

use super::scheduler::{Scheduler, TimerId, TimerKind};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("a response is already being revealed")]
pub struct AnimatorBusy;

/// One step of a reveal run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimStep {
    /// Run started without a sweep; first character follows after one interval
    Started,
    /// Run started with a sweep
    SweepStarted,
    /// Sweep finished; first character follows immediately
    SweepEnded,
    /// Next character of the text (line breaks included)
    Reveal(char),
    /// Whole text revealed, run finished
    Done,
    /// Timer did not belong to the current run
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Sweeping,
    Revealing,
}

#[derive(Debug)]
struct Run {
    chars: Vec<char>,
    revealed: usize,
    timer: TimerId,
    stage: Stage,
}

/// Response animator
#[derive(Debug)]
pub struct ResponseAnimator {
    char_interval: Duration,
    sweep: Duration,
    run: Option<Run>,
}

impl ResponseAnimator {
    /// `sweep` of zero disables the sweep phase
    pub fn new(char_interval: Duration, sweep: Duration) -> Self {
        Self {
            char_interval,
            sweep,
            run: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Begin revealing `text`
    pub fn start(&mut self, text: &str, sched: &mut Scheduler) -> Result<AnimStep, AnimatorBusy> {
        if self.run.is_some() {
            return Err(AnimatorBusy);
        }

        let (stage, delay, step) = if self.sweep.is_zero() {
            (Stage::Revealing, self.char_interval, AnimStep::Started)
        } else {
            (Stage::Sweeping, self.sweep, AnimStep::SweepStarted)
        };

        self.run = Some(Run {
            chars: text.chars().collect(),
            revealed: 0,
            timer: sched.schedule(delay, TimerKind::Animation),
            stage,
        });
        Ok(step)
    }

    /// Handle an animation timer
    pub fn on_timer(&mut self, id: TimerId, sched: &mut Scheduler) -> AnimStep {
        let run = match self.run.as_mut() {
            Some(run) if run.timer == id => run,
            _ => return AnimStep::Stale,
        };

        match run.stage {
            Stage::Sweeping => {
                run.stage = Stage::Revealing;
                run.timer = sched.schedule(Duration::ZERO, TimerKind::Animation);
                AnimStep::SweepEnded
            }
            Stage::Revealing => match run.chars.get(run.revealed).copied() {
                Some(ch) => {
                    run.revealed += 1;
                    run.timer = sched.schedule(self.char_interval, TimerKind::Animation);
                    AnimStep::Reveal(ch)
                }
                None => {
                    self.run = None;
                    AnimStep::Done
                }
            },
        }
    }

    /// Text revealed so far in the current run
    #[cfg(test)]
    pub fn prefix(&self) -> String {
        self.run
            .as_ref()
            .map(|run| run.chars[..run.revealed].iter().collect())
            .unwrap_or_default()
    }

    /// Abort the current run, if any
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

    /// Drive the animator until `Done`, collecting steps with their times
    fn drain(anim: &mut ResponseAnimator, sched: &mut Scheduler) -> Vec<(Duration, AnimStep)> {
        let mut steps = Vec::new();
        while let Some((id, kind)) = sched.pop_due(ms(60_000)) {
            assert_eq!(kind, TimerKind::Animation);
            let step = anim.on_timer(id, sched);
            steps.push((sched.now(), step));
            if step == AnimStep::Done {
                break;
            }
        }
        steps
    }

    #[test]
    fn test_reveal_without_sweep() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), Duration::ZERO);

        assert_eq!(anim.start("ok", &mut sched), Ok(AnimStep::Started));
        let steps = drain(&mut anim, &mut sched);

        assert_eq!(
            steps,
            vec![
                (ms(25), AnimStep::Reveal('o')),
                (ms(50), AnimStep::Reveal('k')),
                (ms(75), AnimStep::Done),
            ]
        );
        assert!(!anim.is_running());
    }

    #[test]
    fn test_sweep_precedes_first_character() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), ms(200));

        assert_eq!(anim.start("a\nb", &mut sched), Ok(AnimStep::SweepStarted));
        let steps = drain(&mut anim, &mut sched);

        assert_eq!(
            steps,
            vec![
                (ms(200), AnimStep::SweepEnded),
                (ms(200), AnimStep::Reveal('a')),
                (ms(225), AnimStep::Reveal('\n')),
                (ms(250), AnimStep::Reveal('b')),
                (ms(275), AnimStep::Done),
            ]
        );
    }

    #[test]
    fn test_prefix_grows() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(10), Duration::ZERO);
        anim.start("MU-TH-UR", &mut sched).unwrap();

        for expected in ["M", "MU", "MU-"] {
            let (id, _) = sched.pop_due(ms(1_000)).unwrap();
            anim.on_timer(id, &mut sched);
            assert_eq!(anim.prefix(), expected);
        }
    }

    #[test]
    fn test_busy_while_running() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), Duration::ZERO);

        anim.start("first", &mut sched).unwrap();
        assert_eq!(anim.start("second", &mut sched), Err(AnimatorBusy));
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_empty_text_finishes() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), Duration::ZERO);

        anim.start("", &mut sched).unwrap();
        assert_eq!(drain(&mut anim, &mut sched), vec![(ms(25), AnimStep::Done)]);
    }

    #[test]
    fn test_cancel_leaves_other_timers_alone() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), ms(200));
        let other = sched.schedule(ms(10_000), TimerKind::Inactivity);

        anim.start("text", &mut sched).unwrap();
        anim.cancel(&mut sched);

        assert!(!anim.is_running());
        assert!(sched.is_pending(other));
        assert_eq!(sched.pending(), 1);
        assert_eq!(anim.prefix(), "");
    }

    #[test]
    fn test_stale_timer_ignored() {
        let mut sched = Scheduler::new();
        let mut anim = ResponseAnimator::new(ms(25), Duration::ZERO);
        let foreign = sched.schedule(ms(1), TimerKind::Animation);

        anim.start("x", &mut sched).unwrap();
        assert_eq!(anim.on_timer(foreign, &mut sched), AnimStep::Stale);
        assert_eq!(anim.prefix(), "");
    }
}
