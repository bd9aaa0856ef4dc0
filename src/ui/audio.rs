//! Audio cues
//!
//! A text terminal has one sound: the bell. Each cue can be routed to it
//! independently; write failures are ignored.

use std::io::{self, Write};

use crate::config::AudioSection;
use crate::core::AudioCue;

/// Rings the terminal bell for the enabled cues
pub struct TerminalBell {
    boot: bool,
    keys: bool,
    typing: bool,
}

impl TerminalBell {
    pub fn from_config(audio: &AudioSection) -> Self {
        Self {
            boot: audio.boot,
            keys: audio.keys,
            typing: audio.typing,
        }
    }

    fn ring(&self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

impl AudioCue for TerminalBell {
    fn play_boot_cue(&mut self) {
        if self.boot {
            self.ring();
        }
    }

    fn play_key_cue(&mut self) {
        if self.keys {
            self.ring();
        }
    }

    fn play_type_cue(&mut self) {
        if self.typing {
            self.ring();
        }
    }
}

/// No sound at all
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioCue for Silent {
    fn play_boot_cue(&mut self) {}
    fn play_key_cue(&mut self) {}
    fn play_type_cue(&mut self) {}
}
