//! cli
//!
//! Command-line interface layer for wry.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise diagnostic logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers in [`commands`] resolve configuration and
//! the target org, then call into [`crate::core`] for the actual work.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Flags every command handler needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub debug: bool,
    pub quiet: bool,
    pub json: bool,
    pub interactive: bool,
}

impl Context {
    /// Verbosity for progress output. JSON output implies quiet progress.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet || self.json, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.debug);

    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
        interactive: cli.interactive(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Diagnostics go to stderr; `RUST_LOG` refines the default level.
fn init_tracing(debug: bool) {
    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // A second init (tests calling run twice) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
