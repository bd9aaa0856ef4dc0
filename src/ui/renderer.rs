//! Terminal renderer using crossterm
//!
//! Keeps a model of the boot screen, the transcript and the prompt line, and
//! redraws it on demand. The `Renderer` trait methods only update the model;
//! all terminal I/O happens in `draw`.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossterm::event::KeyEvent;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthChar;

use crate::config::ColorScheme;
use crate::core::session::PROMPT;
use crate::core::Renderer;
use crate::ui::input::{EditAction, LineEditor};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Boot,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Echo,
    Response,
}

#[derive(Debug, Clone)]
struct TranscriptLine {
    text: String,
    kind: LineKind,
}

/// Split `text` into rows no wider than `width` columns
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    rows.push(current);
    rows
}

/// Full-screen crossterm renderer
pub struct TermRenderer {
    scheme: ColorScheme,
    mode: Mode,
    boot_text: String,
    transcript: Vec<TranscriptLine>,
    sweeping: bool,
    editor: LineEditor,
    size: (u16, u16),
    dirty: bool,
    initialized: bool,
}

impl TermRenderer {
    pub fn with_color_scheme(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            mode: Mode::Boot,
            boot_text: String::new(),
            transcript: Vec::new(),
            sweeping: false,
            editor: LineEditor::new(),
            size: (80, 24),
            dirty: true,
            initialized: false,
        }
    }

    /// Get terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        self.size = Self::size()?;
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        self.initialized = true;
        self.dirty = true;
        debug!("Renderer initialized at {}x{}", self.size.0, self.size.1);
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show, EnableLineWrap);
        let _ = execute!(stdout, crossterm::event::DisableMouseCapture);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        terminal::disable_raw_mode()?;
        println!();
        Ok(())
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
        self.dirty = true;
    }

    /// Feed a key to the prompt line. Keys are ignored on the boot screen.
    pub fn handle_key(&mut self, event: &KeyEvent) -> EditAction {
        if self.mode == Mode::Boot {
            return EditAction::Ignored;
        }
        let action = self.editor.handle_key(event);
        if action != EditAction::Ignored {
            self.dirty = true;
        }
        action
    }

    /// Redraw if anything changed
    pub fn draw(&mut self) -> io::Result<()> {
        if !self.dirty || !self.initialized {
            return Ok(());
        }
        self.dirty = false;

        let mut stdout = io::stdout();
        queue!(
            stdout,
            SetBackgroundColor(self.scheme.background.to_crossterm()),
            Clear(ClearType::All)
        )?;
        match self.mode {
            Mode::Boot => self.draw_boot(&mut stdout)?,
            Mode::Terminal => self.draw_terminal(&mut stdout)?,
        }
        queue!(stdout, ResetColor)?;
        stdout.flush()
    }

    fn draw_boot(&self, out: &mut impl Write) -> io::Result<()> {
        let (cols, rows) = self.size;
        queue!(out, SetForegroundColor(self.scheme.boot.to_crossterm()))?;
        let rows_iter = self.boot_text.lines().flat_map(|line| wrap(line, cols as usize));
        for (row, text) in rows_iter.take(rows as usize).enumerate() {
            queue!(out, MoveTo(0, row as u16), Print(text))?;
        }
        Ok(())
    }

    fn draw_terminal(&self, out: &mut impl Write) -> io::Result<()> {
        let (cols, rows) = self.size;
        let width = cols as usize;
        let last = self.transcript.len().saturating_sub(1);

        // (text, color) per screen row, transcript first, prompt last
        let mut screen: Vec<(String, crossterm::style::Color)> = Vec::new();
        for (idx, line) in self.transcript.iter().enumerate() {
            if self.sweeping && idx == last {
                let bar = "░".repeat(width / 2);
                screen.push((bar, self.scheme.sweep.to_crossterm()));
                continue;
            }
            let color = match line.kind {
                LineKind::Echo => self.scheme.echo.to_crossterm(),
                LineKind::Response => self.scheme.foreground.to_crossterm(),
            };
            for row in wrap(&line.text, width) {
                screen.push((row, color));
            }
        }

        let (plain, caret) = self.editor.split_caret();
        let prompt = format!("{}{}", PROMPT, plain);
        let prompt_rows = wrap(&prompt, width);
        let visible = (rows as usize).saturating_sub(prompt_rows.len());
        let skip = screen.len().saturating_sub(visible);

        let mut row = 0u16;
        for (text, color) in screen.into_iter().skip(skip) {
            queue!(out, MoveTo(0, row), SetForegroundColor(color), Print(text))?;
            row += 1;
        }

        queue!(out, SetForegroundColor(self.scheme.echo.to_crossterm()))?;
        for text in prompt_rows {
            queue!(out, MoveTo(0, row), Print(text))?;
            row += 1;
        }
        let caret_text = caret.map(String::from).unwrap_or_else(|| " ".to_string());
        queue!(
            out,
            SetForegroundColor(self.scheme.caret.to_crossterm()),
            SetAttribute(Attribute::Reverse),
            Print(caret_text),
            SetAttribute(Attribute::NoReverse)
        )?;
        Ok(())
    }
}

impl Renderer for TermRenderer {
    fn show_boot_screen(&mut self) {
        self.mode = Mode::Boot;
        self.boot_text.clear();
        self.dirty = true;
    }

    fn show_boot_prefix(&mut self, text: &str) {
        self.boot_text.clear();
        self.boot_text.push_str(text);
        self.dirty = true;
    }

    fn reveal_terminal(&mut self) {
        self.mode = Mode::Terminal;
        self.dirty = true;
    }

    fn echo_line(&mut self, text: &str) {
        self.transcript.push(TranscriptLine {
            text: text.to_string(),
            kind: LineKind::Echo,
        });
        self.dirty = true;
    }

    fn begin_response(&mut self) {
        self.transcript.push(TranscriptLine {
            text: String::new(),
            kind: LineKind::Response,
        });
        self.dirty = true;
    }

    fn show_sweep(&mut self, visible: bool) {
        self.sweeping = visible;
        self.dirty = true;
    }

    fn append_revealed_char(&mut self, ch: char) {
        if ch == '\n' {
            self.transcript.push(TranscriptLine {
                text: String::new(),
                kind: LineKind::Response,
            });
        } else if let Some(line) = self.transcript.last_mut() {
            line.text.push(ch);
        } else {
            self.transcript.push(TranscriptLine {
                text: ch.to_string(),
                kind: LineKind::Response,
            });
        }
        self.dirty = true;
    }

    fn end_response(&mut self) {
        self.sweeping = false;
    }

    fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.sweeping = false;
        self.dirty = true;
    }

    fn clear_input(&mut self) {
        self.editor.clear();
        self.dirty = true;
    }
}

impl Drop for TermRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Line-oriented renderer for headless runs
///
/// Writes the transcript as plain text. Boot prefixes are collected and the
/// finished boot text is printed once the terminal is revealed.
pub struct PlainRenderer<W: Write> {
    out: W,
    boot_text: String,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            boot_text: String::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("Plain renderer write failed: {}", e);
        }
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn show_boot_screen(&mut self) {
        self.boot_text.clear();
        self.emit("=== BOOT ===\n");
    }

    fn show_boot_prefix(&mut self, text: &str) {
        self.boot_text.clear();
        self.boot_text.push_str(text);
    }

    fn reveal_terminal(&mut self) {
        let text = format!("{}\n=== TERMINAL ===\n", self.boot_text);
        self.emit(&text);
    }

    fn echo_line(&mut self, text: &str) {
        self.emit(&format!("{}\n", text));
    }

    fn begin_response(&mut self) {}

    fn show_sweep(&mut self, _visible: bool) {}

    fn append_revealed_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.emit(ch.encode_utf8(&mut buf));
    }

    fn end_response(&mut self) {
        self.emit("\n");
    }

    fn clear_transcript(&mut self) {
        self.emit("=== WIPE ===\n");
    }

    fn clear_input(&mut self) {}
}
