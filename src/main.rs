//! retroterm - a retro computer terminal
//!
//! retroterm plays a boot sequence, then waits for an authentication phrase
//! before it will answer a small set of commands. Responses are typed out
//! character by character. The screen wipes itself after a few exchanges and
//! the whole terminal reboots after a period of inactivity.
//!
//! # Quick Start
//!
//! ```text
//! retroterm                  # Start the terminal
//! retroterm -c my.toml       # Use a specific config file
//! retroterm --demo           # Scripted headless session
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Submit the line |
//! | Backspace | Delete last character |
//! | Esc / Ctrl+C / Ctrl+D | Quit |

mod config;
mod core;
mod ui;

use std::env;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config as RetrotermConfig;
use crate::core::{Activity, Phase, Renderer, TerminalSession};
use crate::ui::input;
use crate::ui::{EditAction, PlainRenderer, Silent, TermRenderer, TerminalBell};

/// Command line options
#[derive(Default)]
struct Config {
    /// Config file given with --config
    config_path: Option<PathBuf>,
    /// Run the scripted headless session
    demo: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest the event loop sleeps without checking timers
const MAX_POLL: Duration = Duration::from_millis(50);

/// Lines typed by `--demo` after the gate phrase
const DEMO_SCRIPT: &[&str] = &["help", "foo", "version", "what is special order 937 ?"];

fn print_version() {
    eprintln!("retroterm {}", VERSION);
}

fn print_help() {
    eprintln!("retroterm {} - A retro computer terminal", VERSION);
    eprintln!();
    eprintln!("Usage: retroterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>   Use this config file");
    eprintln!("      --demo            Run a scripted session without a screen");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Submit the line");
    eprintln!("  Backspace             Delete last character");
    eprintln!("  Esc, Ctrl+C, Ctrl+D   Quit");
    eprintln!();
    eprintln!("Configuration: ~/.retroterm/config.toml");
    eprintln!("Log file:      ~/.retroterm/retroterm.log (level from RETROTERM_LOG)");
    eprintln!();
    eprintln!("Color schemes: green, amber, white, blue");
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing config file argument".to_string());
                }
                config.config_path = Some(PathBuf::from(&args[i]));
            }
            "--demo" => {
                config.demo = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Log to ~/.retroterm/retroterm.log so output never lands on the screen
fn init_logging() {
    let home = env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .map(PathBuf::from);

    let log_path = home
        .map(|h| h.join(".retroterm").join("retroterm.log"))
        .unwrap_or_else(|| PathBuf::from("retroterm.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("RETROTERM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("retroterm {} starting...", VERSION);

    // An explicit config file must exist and be valid
    // The default one may be missing or broken
    let config = match args.config_path {
        Some(ref path) => RetrotermConfig::load_from(path)?,
        None => RetrotermConfig::load(),
    };

    if args.demo {
        return run_demo(&config);
    }
    run_terminal(&config)
}

/// Run the interactive terminal
fn run_terminal(config: &RetrotermConfig) -> anyhow::Result<()> {
    let commands = config.command_table()?;
    info!("Loaded {} commands", commands.len());
    info!("Color scheme: {}", config.color_scheme);

    let mut renderer = TermRenderer::with_color_scheme(config.get_color_scheme());
    renderer.init()?;

    let mut session = TerminalSession::new(
        config.session_config(),
        commands,
        renderer,
        TerminalBell::from_config(&config.audio),
    );
    session.start();

    let result = run_main_loop(&mut session);
    if let Err(ref e) = result {
        error!("Main loop failed: {}", e);
    }

    // Cleanup
    let _ = session.renderer_mut().cleanup();
    result
}

/// Main event loop
fn run_main_loop(session: &mut TerminalSession<TermRenderer, TerminalBell>) -> anyhow::Result<()> {
    let started = Instant::now();

    loop {
        session.advance_to(started.elapsed());
        session.renderer_mut().draw()?;

        // Sleep until the next timer, input, or MAX_POLL
        let now = started.elapsed();
        let timeout = session
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(MAX_POLL)
            .min(MAX_POLL);

        if !event::poll(timeout)? {
            continue;
        }

        // Timers that came due while waiting run before the event
        session.advance_to(started.elapsed());

        match event::read()? {
            Event::Key(key_event) => {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if input::is_quit(&key_event) {
                    info!("Quit requested");
                    break;
                }
                if session.phase() == Phase::Booting {
                    continue;
                }

                session.on_activity(input::activity(&key_event));
                if let EditAction::Submitted(line) = session.renderer_mut().handle_key(&key_event) {
                    if let Err(e) = session.on_line_submitted(&line) {
                        debug!("Dropped {:?}: {}", line, e);
                    }
                }
            }
            Event::Mouse(_) => {
                session.on_activity(Activity::Pointer);
            }
            Event::Resize(cols, rows) => {
                session.renderer_mut().resize(cols, rows);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Run timers until `done` holds, on the session's virtual clock
fn run_until<R: Renderer>(session: &mut TerminalSession<R, Silent>, done: impl Fn(&TerminalSession<R, Silent>) -> bool) {
    while !done(session) {
        match session.next_deadline() {
            Some(deadline) => session.advance_to(deadline),
            None => break,
        }
    }
}

/// Scripted session on a virtual clock, printed as plain text
fn run_demo(config: &RetrotermConfig) -> anyhow::Result<()> {
    let session_config = config.session_config();
    let gate_phrase = session_config.gate_phrase.clone();
    let idle = session_config.inactivity_timeout;

    let mut session = TerminalSession::new(
        session_config,
        config.command_table()?,
        PlainRenderer::new(io::stdout()),
        Silent,
    );
    session.start();
    run_until(&mut session, |s| s.phase() != Phase::Booting);

    let script = std::iter::once(gate_phrase.as_str()).chain(DEMO_SCRIPT.iter().copied());
    for line in script {
        session.on_activity(Activity::Key { printable: false });
        match session.on_line_submitted(line) {
            Ok(outcome) => debug!("{:?} -> {:?}", line, outcome),
            Err(e) => warn!("Demo line {:?} dropped: {}", line, e),
        }
        run_until(&mut session, |s| !s.is_animating());
        if session.phase() == Phase::Resetting {
            run_until(&mut session, |s| s.phase() != Phase::Resetting);
        }
    }

    // Sit idle until the terminal reboots, then let the boot finish
    let idle_until = session.now() + idle;
    session.advance_to(idle_until);
    run_until(&mut session, |s| s.phase() != Phase::Booting);
    Ok(())
}
