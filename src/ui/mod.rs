//! User interface rendering and input handling.
//!
//! This module provides the presentation side of the terminal:
//!
//! - **renderer**: crossterm `TermRenderer` and the headless `PlainRenderer`
//! - **input**: key events to prompt-line edits
//! - **audio**: terminal bell cues
//!
//! Both renderers implement `core::Renderer`; the session never calls
//! crossterm itself.

pub mod audio;
pub mod input;
pub mod renderer;

pub use audio::{Silent, TerminalBell};
pub use input::EditAction;
pub use renderer::{PlainRenderer, TermRenderer};
