//! Core terminal session components.
//!
//! This module contains everything with state and timing; nothing in here
//! touches the real terminal:
//!
//! - **scheduler**: virtual clock with cancelable one-shot timers
//! - **commands**: the fixed command vocabulary
//! - **boot**: boot text reveal
//! - **animator**: typewriter reveal of responses
//! - **guard**: inactivity timeout
//! - **session**: the state machine tying them together
//! - **surface**: `Renderer` / `AudioCue` traits implemented by the UI
//!
//! # Architecture
//!
//! ```text
//! TerminalSession
//! ├── Scheduler (single timer queue)
//! ├── BootSequencer
//! ├── CommandTable
//! ├── ResponseAnimator
//! ├── InactivityGuard
//! └── Renderer + AudioCue (presentation)
//! ```

pub mod animator;
pub mod boot;
pub mod commands;
pub mod guard;
pub mod scheduler;
pub mod session;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::CommandTable;
pub use session::{Activity, Phase, SessionConfig, TerminalSession};
pub use surface::{AudioCue, Renderer};
