//! Presentation boundary
//!
//! The session never touches the screen or the speaker directly. It talks to
//! a `Renderer` and an `AudioCue`; both are fire-and-forget and must swallow
//! their own failures.

/// Screen operations requested by the session
pub trait Renderer {
    /// Switch to the (empty) boot screen
    fn show_boot_screen(&mut self);
    /// Replace the boot screen text with a longer prefix of the boot text
    fn show_boot_prefix(&mut self, text: &str);
    /// Hide the boot screen and show the terminal
    fn reveal_terminal(&mut self);
    /// Append a full line to the transcript
    fn echo_line(&mut self, text: &str);
    /// Start a fresh transcript line for an animated response
    fn begin_response(&mut self);
    /// Show or hide the sweep placeholder on the response line
    fn show_sweep(&mut self, visible: bool);
    /// Append one revealed character to the current response
    fn append_revealed_char(&mut self, ch: char);
    /// Close the current response line
    fn end_response(&mut self);
    /// Remove everything from the transcript
    fn clear_transcript(&mut self);
    /// Drop any half-typed input
    fn clear_input(&mut self);
}

/// Sound cues requested by the session
pub trait AudioCue {
    fn play_boot_cue(&mut self);
    fn play_key_cue(&mut self);
    fn play_type_cue(&mut self);
}
