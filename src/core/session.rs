//! Session management
//!
//! `TerminalSession` owns the phase, the gate flag, the exchange counter and
//! every timer. Hosts feed it three kinds of input: activity (keys, pointer),
//! submitted lines, and the passage of time via `advance_to`.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::animator::{AnimStep, ResponseAnimator};
use super::boot::{BootSequencer, BootStep, DEFAULT_BOOT_TEXT};
use super::commands::{normalize, CommandTable, Lookup, GATE_ACKNOWLEDGEMENT};
use super::guard::InactivityGuard;
use super::scheduler::{Scheduler, TimerId, TimerKind};
use super::surface::{AudioCue, Renderer};

/// Marker echoed in front of every submitted line
pub const PROMPT: &str = "> ";

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Booting,
    AwaitingGatePhrase,
    Active,
    Animating,
    Resetting,
}

/// Raw input activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Key { printable: bool },
    Pointer,
}

/// Why a submitted line was dropped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("terminal is still booting")]
    Booting,

    #[error("a response is still being revealed")]
    Animating,

    #[error("transcript wipe is pending")]
    Resetting,
}

/// What an accepted line did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    GateAccepted,
    GateRejected,
    Dispatched { found: bool },
}

/// Session settings
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub gate_phrase: String,
    pub reset_threshold: u32,
    pub reset_delay: Duration,
    pub inactivity_timeout: Duration,
    pub char_interval: Duration,
    /// Zero disables the sweep
    pub sweep: Duration,
    pub boot_text: String,
    pub boot_tick: Duration,
    pub boot_pause: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gate_phrase: "hi mother".to_string(),
            reset_threshold: 3,
            reset_delay: Duration::from_millis(3000),
            inactivity_timeout: Duration::from_millis(10_000),
            char_interval: Duration::from_millis(25),
            sweep: Duration::from_millis(200),
            boot_text: DEFAULT_BOOT_TEXT.to_string(),
            boot_tick: Duration::from_millis(40),
            boot_pause: Duration::from_millis(800),
        }
    }
}

impl SessionConfig {
    /// Message animated for anything other than the gate phrase
    pub fn rejection(&self) -> String {
        format!("You must type '{}' as the first prompt.", self.gate_phrase)
    }
}

/// What the running animation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    Acknowledge,
    Reject,
    Exchange,
}

/// A single terminal session
pub struct TerminalSession<R: Renderer, A: AudioCue> {
    config: SessionConfig,
    commands: CommandTable,
    renderer: R,
    audio: A,
    scheduler: Scheduler,
    boot: BootSequencer,
    animator: ResponseAnimator,
    guard: InactivityGuard,
    phase: Phase,
    exchange_count: u32,
    gate_open: bool,
    purpose: Option<Purpose>,
    wipe_timer: Option<TimerId>,
}

impl<R: Renderer, A: AudioCue> TerminalSession<R, A> {
    /// Create a session in `Booting`. Nothing happens until `start`.
    pub fn new(mut config: SessionConfig, commands: CommandTable, renderer: R, audio: A) -> Self {
        if config.reset_threshold == 0 {
            warn!("reset_threshold must be positive, using 1");
            config.reset_threshold = 1;
        }
        let boot = BootSequencer::new(config.boot_text.clone(), config.boot_tick, config.boot_pause);
        let animator = ResponseAnimator::new(config.char_interval, config.sweep);
        Self {
            config,
            commands,
            renderer,
            audio,
            scheduler: Scheduler::new(),
            boot,
            animator,
            guard: InactivityGuard::new(),
            phase: Phase::Booting,
            exchange_count: 0,
            gate_open: false,
            purpose: None,
            wipe_timer: None,
        }
    }

    /// Show the boot screen and start the boot sequence
    pub fn start(&mut self) {
        self.renderer.show_boot_screen();
        match self.boot.run(&mut self.scheduler) {
            BootStep::Started => {
                info!("Boot sequence started");
                self.audio.play_boot_cue();
            }
            step => debug!("Boot not restarted: {:?}", step),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exchange_count(&self) -> u32 {
        self.exchange_count
    }

    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    #[cfg(test)]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next timer is due, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[cfg(test)]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Fire every timer due up to `now`, in deadline order
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((id, kind)) = self.scheduler.pop_due(now) {
            match kind {
                TimerKind::Boot => self.on_boot_timer(id),
                TimerKind::Animation => self.on_animation_timer(id),
                TimerKind::Wipe => self.on_wipe_timer(id),
                TimerKind::Inactivity => {
                    if self.guard.on_timer(id) {
                        self.reboot();
                    }
                }
            }
        }
    }

    /// Key or pointer activity. Rearms the inactivity timer outside boot.
    pub fn on_activity(&mut self, activity: Activity) {
        if self.phase == Phase::Booting {
            return;
        }
        self.guard.rearm(&mut self.scheduler);
        if activity == (Activity::Key { printable: true }) {
            self.audio.play_key_cue();
        }
    }

    /// A complete line from the input source
    pub fn on_line_submitted(&mut self, line: &str) -> Result<Submitted, Rejected> {
        match self.phase {
            Phase::Booting => return Err(Rejected::Booting),
            Phase::Animating => return Err(Rejected::Animating),
            Phase::Resetting => return Err(Rejected::Resetting),
            Phase::AwaitingGatePhrase | Phase::Active => {}
        }
        // Gate acknowledgement and rejection animate outside `Animating`
        if self.animator.is_running() {
            return Err(Rejected::Animating);
        }

        self.renderer.echo_line(&format!("{}{}", PROMPT, line));

        if !self.gate_open {
            if normalize(line) == normalize(&self.config.gate_phrase) {
                info!("Gate phrase accepted");
                self.gate_open = true;
                self.phase = Phase::Active;
                let text = match self.commands.lookup(&self.config.gate_phrase) {
                    Lookup::Found(text) => text.to_string(),
                    Lookup::NotFound => GATE_ACKNOWLEDGEMENT.to_string(),
                };
                self.animate(&text, Purpose::Acknowledge);
                return Ok(Submitted::GateAccepted);
            }
            debug!("Gate phrase rejected: {:?}", line);
            let text = self.config.rejection();
            self.animate(&text, Purpose::Reject);
            return Ok(Submitted::GateRejected);
        }

        let lookup = self.commands.lookup(line);
        let found = lookup.is_found();
        let text = lookup.text().to_string();
        debug!(command = line, found, "Dispatching command");
        self.phase = Phase::Animating;
        self.animate(&text, Purpose::Exchange);
        Ok(Submitted::Dispatched { found })
    }

    fn animate(&mut self, text: &str, purpose: Purpose) {
        self.renderer.begin_response();
        match self.animator.start(text, &mut self.scheduler) {
            Ok(AnimStep::SweepStarted) => self.renderer.show_sweep(true),
            Ok(_) => {}
            Err(e) => {
                warn!("Animation not started: {}", e);
                return;
            }
        }
        self.purpose = Some(purpose);
    }

    fn on_boot_timer(&mut self, id: TimerId) {
        match self.boot.on_timer(id, &mut self.scheduler) {
            BootStep::Prefix(text) => self.renderer.show_boot_prefix(text),
            BootStep::Complete => self.on_boot_complete(),
            _ => {}
        }
    }

    fn on_boot_complete(&mut self) {
        info!("Boot complete, awaiting gate phrase");
        self.renderer.reveal_terminal();
        self.phase = Phase::AwaitingGatePhrase;
        self.guard.arm(self.config.inactivity_timeout, &mut self.scheduler);
    }

    fn on_animation_timer(&mut self, id: TimerId) {
        match self.animator.on_timer(id, &mut self.scheduler) {
            AnimStep::SweepEnded => self.renderer.show_sweep(false),
            AnimStep::Reveal(ch) => {
                self.renderer.append_revealed_char(ch);
                self.audio.play_type_cue();
            }
            AnimStep::Done => {
                self.renderer.end_response();
                self.on_animation_done();
            }
            _ => {}
        }
    }

    fn on_animation_done(&mut self) {
        if self.purpose.take() != Some(Purpose::Exchange) {
            return;
        }

        self.exchange_count += 1;
        if self.exchange_count >= self.config.reset_threshold {
            info!(exchanges = self.exchange_count, "Exchange limit reached, wipe scheduled");
            self.phase = Phase::Resetting;
            self.wipe_timer = Some(self.scheduler.schedule(self.config.reset_delay, TimerKind::Wipe));
        } else {
            self.phase = Phase::Active;
        }
    }

    fn on_wipe_timer(&mut self, id: TimerId) {
        if self.wipe_timer != Some(id) {
            return;
        }
        info!("Wiping transcript");
        self.wipe_timer = None;
        self.renderer.clear_transcript();
        self.renderer.clear_input();
        self.exchange_count = 0;
        self.phase = Phase::Active;
    }

    /// Full reset back to boot after inactivity
    fn reboot(&mut self) {
        info!(phase = ?self.phase, "Inactivity timeout, rebooting");
        self.animator.cancel(&mut self.scheduler);
        self.boot.cancel(&mut self.scheduler);
        self.guard.disarm(&mut self.scheduler);
        if let Some(timer) = self.wipe_timer.take() {
            self.scheduler.cancel(timer);
        }

        self.renderer.clear_transcript();
        self.renderer.clear_input();
        self.purpose = None;
        self.exchange_count = 0;
        self.gate_open = false;
        self.phase = Phase::Booting;
        self.start();
    }
}
