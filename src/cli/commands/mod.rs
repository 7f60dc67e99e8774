//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and resolves the target org
//! 2. Calls into [`crate::core`] to do the work
//! 3. Formats and displays output (text or `--json`)
//!
//! # Async Commands
//!
//! Org commands involve network I/O. Each handler creates a tokio runtime
//! and blocks on its async part; the directory walk itself is synchronous.

mod auth;
mod completion;
mod count;
mod limits;
mod replace;

// Re-export command functions for testing and direct invocation
pub use auth::{auth, AuthOptions};
pub use completion::completion;
pub use count::{count, count_with_org};
pub use limits::{limits, limits_with_org};
pub use replace::{replace, run_transform, ReplaceKind};

use anyhow::{Context as _, Result};

use super::args::{Command, DataAction, FileAction, OrgAction};
use super::Context;
use crate::core::config::Config;
use crate::org::{self, EnvOverride, OrgApi, OrgTarget};
use crate::secrets;
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Data { action } => match action {
            DataAction::Replace {
                org,
                replace,
                outputdir,
            } => replace::replace(
                ctx,
                org.target.as_deref(),
                ReplaceKind::Data,
                &replace,
                Some(&outputdir),
            ),
            DataAction::Count { org, objects } => {
                count::count(ctx, org.target.as_deref(), objects.as_deref())
            }
        },
        Command::File { action } => match action {
            FileAction::Replace {
                org,
                replace,
                outputdir,
            } => replace::replace(
                ctx,
                org.target.as_deref(),
                ReplaceKind::File,
                &replace,
                outputdir.as_deref(),
            ),
        },
        Command::Org { action } => match action {
            OrgAction::Limits { org, limits } => {
                limits::limits(ctx, org.target.as_deref(), limits.as_deref())
            }
        },
        Command::Auth {
            alias,
            instance_url,
            token,
            api_version,
            status,
            logout,
        } => auth::auth(
            ctx,
            AuthOptions {
                alias: &alias,
                instance_url: instance_url.as_deref(),
                token: token.as_deref(),
                api_version: api_version.as_deref(),
                status,
                logout,
            },
        ),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Everything an org command needs: merged config and a connected client.
pub(crate) struct Session {
    pub config: Config,
    pub target: OrgTarget,
    pub org: Box<dyn OrgApi>,
}

/// Load global and project configuration, printing any warnings.
pub(crate) fn load_config(ctx: &Context) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let loaded = Config::load(Some(&cwd)).context("Failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }
    Ok(loaded.config)
}

/// Load configuration and connect to the target org.
pub(crate) fn open_session(ctx: &Context, alias: Option<&str>) -> Result<Session> {
    let config = load_config(ctx)?;
    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;
    let (target, org) = org::connect(alias, &config, store.as_ref(), &EnvOverride::from_env())?;
    tracing::debug!(org = target.label(), api_version = %target.api_version, "connected");
    Ok(Session {
        config,
        target,
        org,
    })
}
