//! In-memory collaborators for session tests

use super::surface::{AudioCue, Renderer};

/// Keeps a plain-text model of what would be on screen
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub boot_text: String,
    pub boot_visible: bool,
    pub transcript: Vec<String>,
    pub sweeping: bool,
    pub transcript_clears: usize,
    pub input_clears: usize,
}

impl RecordingRenderer {
    pub fn lines(&self) -> Vec<&str> {
        self.transcript.iter().map(String::as_str).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn show_boot_screen(&mut self) {
        self.boot_visible = true;
        self.boot_text.clear();
    }

    fn show_boot_prefix(&mut self, text: &str) {
        self.boot_text = text.to_string();
    }

    fn reveal_terminal(&mut self) {
        self.boot_visible = false;
    }

    fn echo_line(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn begin_response(&mut self) {
        self.transcript.push(String::new());
    }

    fn show_sweep(&mut self, visible: bool) {
        self.sweeping = visible;
    }

    fn append_revealed_char(&mut self, ch: char) {
        if ch == '\n' {
            self.transcript.push(String::new());
        } else if let Some(line) = self.transcript.last_mut() {
            line.push(ch);
        } else {
            self.transcript.push(ch.to_string());
        }
    }

    fn end_response(&mut self) {}

    fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.transcript_clears += 1;
    }

    fn clear_input(&mut self) {
        self.input_clears += 1;
    }
}

/// Counts cue requests
#[derive(Debug, Default)]
pub struct CountingAudio {
    pub boot: usize,
    pub key: usize,
    pub typed: usize,
}

impl AudioCue for CountingAudio {
    fn play_boot_cue(&mut self) {
        self.boot += 1;
    }

    fn play_key_cue(&mut self) {
        self.key += 1;
    }

    fn play_type_cue(&mut self) {
        self.typed += 1;
    }
}
