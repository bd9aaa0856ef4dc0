//! Configuration and color scheme management for retroterm.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.retroterm/config.toml`
//! - Built-in phosphor color schemes (green, amber, white, blue)
//! - Conversion into the core `SessionConfig` and `CommandTable`
//!
//! # Configuration File
//!
//! ```toml
//! color_scheme = "amber"
//!
//! [session]
//! gate_phrase = "hi mother"
//! reset_threshold = 3
//! reset_delay_ms = 3000
//! inactivity_timeout_ms = 10000
//!
//! [timing]
//! char_reveal_interval_ms = 25
//! boot_tick_interval_ms = 40
//! boot_pause_ms = 800
//! sweep_duration_ms = 200
//!
//! [audio]
//! boot = true
//! keys = false
//! typing = false
//!
//! [commands]
//! "status" = "ALL SYSTEMS NOMINAL"
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults above.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::core::boot::DEFAULT_BOOT_TEXT;
use crate::core::commands::CommandTableError;
use crate::core::{CommandTable, SessionConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("session.reset_threshold must be at least 1")]
    ZeroThreshold,

    #[error("session.gate_phrase must not be blank")]
    BlankGatePhrase,

    #[error("Invalid [commands] table: {0}")]
    Commands(#[from] CommandTableError),
}

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color scheme name
    pub color_scheme: String,
    /// Gate and reset behavior
    pub session: SessionSection,
    /// Animation speeds
    pub timing: TimingSection,
    /// Which cues ring the terminal bell
    pub audio: AudioSection,
    /// Boot screen
    pub boot: BootSection,
    /// Extra commands (or replacements for built-in responses)
    pub commands: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_scheme: "green".to_string(),
            session: SessionSection::default(),
            timing: TimingSection::default(),
            audio: AudioSection::default(),
            boot: BootSection::default(),
            commands: BTreeMap::new(),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub gate_phrase: String,
    pub reset_threshold: u32,
    pub reset_delay_ms: u64,
    pub inactivity_timeout_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            gate_phrase: defaults.gate_phrase,
            reset_threshold: defaults.reset_threshold,
            reset_delay_ms: defaults.reset_delay.as_millis() as u64,
            inactivity_timeout_ms: defaults.inactivity_timeout.as_millis() as u64,
        }
    }
}

/// Animation timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    pub char_reveal_interval_ms: u64,
    pub boot_tick_interval_ms: u64,
    pub boot_pause_ms: u64,
    pub sweep_duration_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            char_reveal_interval_ms: 25,
            boot_tick_interval_ms: 40,
            boot_pause_ms: 800,
            sweep_duration_ms: 200,
        }
    }
}

/// Bell cues
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSection {
    pub boot: bool,
    pub keys: bool,
    pub typing: bool,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            boot: true,
            keys: false,
            typing: false,
        }
    }
}

/// Boot screen settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootSection {
    pub text: String,
}

impl Default for BootSection {
    fn default() -> Self {
        Self {
            text: DEFAULT_BOOT_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Load `~/.retroterm/config.toml`. A missing file is not an error;
    /// a broken one is logged and replaced by defaults.
    pub fn load() -> Self {
        let path = match Self::get_config_path() {
            Some(path) if path.exists() => path,
            _ => return Self::default(),
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate a specific config file, which must exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.reset_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.session.gate_phrase.trim().is_empty() {
            return Err(ConfigError::BlankGatePhrase);
        }
        self.command_table()?;
        Ok(())
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".retroterm").join("config.toml"))
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.color_scheme)
    }

    /// Session settings for the core state machine
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            gate_phrase: self.session.gate_phrase.clone(),
            reset_threshold: self.session.reset_threshold,
            reset_delay: Duration::from_millis(self.session.reset_delay_ms),
            inactivity_timeout: Duration::from_millis(self.session.inactivity_timeout_ms),
            char_interval: Duration::from_millis(self.timing.char_reveal_interval_ms),
            sweep: Duration::from_millis(self.timing.sweep_duration_ms),
            boot_text: self.boot.text.clone(),
            boot_tick: Duration::from_millis(self.timing.boot_tick_interval_ms),
            boot_pause: Duration::from_millis(self.timing.boot_pause_ms),
        }
    }

    /// Built-in commands plus the `[commands]` table
    pub fn command_table(&self) -> Result<CommandTable, CommandTableError> {
        CommandTable::with_overrides(&self.commands)
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub name: String,

    pub background: Color,
    /// Transcript and response text
    pub foreground: Color,
    /// Boot screen text
    pub boot: Color,
    /// Echoed prompt lines
    pub echo: Color,
    /// Most recently typed input character
    pub caret: Color,
    /// Sweep placeholder
    pub sweep: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::green()
    }
}

impl ColorScheme {
    /// P1 green phosphor
    pub fn green() -> Self {
        Self {
            name: "green".to_string(),
            background: Color::new(5, 12, 5),
            foreground: Color::new(51, 255, 102),
            boot: Color::new(30, 170, 70),
            echo: Color::new(150, 255, 170),
            caret: Color::new(220, 255, 220),
            sweep: Color::new(20, 90, 40),
        }
    }

    /// P3 amber phosphor
    pub fn amber() -> Self {
        Self {
            name: "amber".to_string(),
            background: Color::new(15, 8, 0),
            foreground: Color::new(255, 176, 0),
            boot: Color::new(190, 120, 0),
            echo: Color::new(255, 204, 102),
            caret: Color::new(255, 235, 190),
            sweep: Color::new(110, 65, 0),
        }
    }

    /// P4 white phosphor
    pub fn white() -> Self {
        Self {
            name: "white".to_string(),
            background: Color::new(10, 10, 12),
            foreground: Color::new(225, 228, 235),
            boot: Color::new(160, 162, 170),
            echo: Color::new(255, 255, 255),
            caret: Color::new(255, 255, 255),
            sweep: Color::new(70, 72, 80),
        }
    }

    /// Cool blue, loosely after vector displays
    pub fn blue() -> Self {
        Self {
            name: "blue".to_string(),
            background: Color::new(2, 6, 20),
            foreground: Color::new(110, 190, 255),
            boot: Color::new(70, 130, 200),
            echo: Color::new(170, 220, 255),
            caret: Color::new(225, 240, 255),
            sweep: Color::new(30, 60, 110),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "amber" | "p3" => Self::amber(),
            "white" | "p4" => Self::white(),
            "blue" => Self::blue(),
            _ => Self::green(),
        }
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
