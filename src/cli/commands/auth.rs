//! cli::commands::auth
//!
//! Authentication command for storing org credentials.
//!
//! # Design
//!
//! The auth command:
//! - Stores the access token via SecretStore under `org.<alias>.token`
//! - Records the instance URL (and optional API version) in global config
//! - NEVER prints tokens to stdout/stderr
//! - Supports both interactive and non-interactive modes
//!
//! # Example
//!
//! ```bash
//! # Interactive (prompts for token)
//! wry auth -u dev --instance-url https://acme.my.salesforce.com
//!
//! # Non-interactive
//! wry auth -u dev --instance-url https://acme.my.salesforce.com --token 00D...
//!
//! # Check status
//! wry auth -u dev --status
//!
//! # Remove stored token
//! wry auth -u dev --logout
//! ```

use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};

use super::load_config;
use crate::cli::Context;
use crate::core::config::schema::{validate_alias, validate_api_version, validate_instance_url};
use crate::core::config::{Config, OrgConfig};
use crate::secrets::{self, token_key, SecretStore};
use crate::ui::output::{self, Verbosity};

/// Arguments of `wry auth`.
#[derive(Debug, Clone, Copy)]
pub struct AuthOptions<'a> {
    pub alias: &'a str,
    pub instance_url: Option<&'a str>,
    pub token: Option<&'a str>,
    pub api_version: Option<&'a str>,
    pub status: bool,
    pub logout: bool,
}

/// Run the auth command.
///
/// # Security
///
/// This function NEVER prints the token value. It only confirms success/failure.
pub fn auth(ctx: &Context, opts: AuthOptions<'_>) -> Result<()> {
    validate_alias(opts.alias)?;

    let config = load_config(ctx)?;
    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;

    // Handle --status
    if opts.status {
        return show_status(store.as_ref(), &config, opts.alias, ctx.quiet);
    }

    // Handle --logout
    if opts.logout {
        return do_logout(store.as_ref(), opts.alias, ctx.verbosity());
    }

    // Instance URL: flag, else what is already configured for the alias
    let instance_url = match opts.instance_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => match config.org(opts.alias) {
            Some(org) => org.instance_url.clone(),
            None => bail!(
                "Org '{}' is not configured yet. Use --instance-url <URL>.",
                opts.alias
            ),
        },
    };
    validate_instance_url(&instance_url)?;
    if let Some(version) = opts.api_version {
        validate_api_version(version)?;
    }

    // Get token value
    let token_value = get_token(ctx, opts.token)?;

    // Validate token format (basic checks)
    validate_token(&token_value)?;

    let mut global = config.global.clone();
    let entry = global
        .orgs
        .entry(opts.alias.to_string())
        .or_insert_with(|| OrgConfig {
            instance_url: instance_url.clone(),
            api_version: None,
        });
    entry.instance_url = instance_url;
    if let Some(version) = opts.api_version {
        entry.api_version = Some(version.to_string());
    }
    let became_default = global.default_org.is_none();
    if became_default {
        global.default_org = Some(opts.alias.to_string());
    }

    let path = match config.global_config_loaded_from() {
        Some(path) => path.to_path_buf(),
        None => Config::global_config_path()?,
    };

    // Store the token, then the org entry that points at it
    store
        .set(&token_key(opts.alias), &token_value)
        .context("Failed to store token")?;
    Config::write_global(&path, &global).context("Failed to write configuration")?;
    tracing::debug!(path = %path.display(), alias = opts.alias, "saved org");

    let verbosity = ctx.verbosity();
    output::success(
        format!("Authentication configured for {}.", opts.alias),
        verbosity,
    );
    if became_default {
        output::print(format!("'{}' is now the default org.", opts.alias), verbosity);
    }

    Ok(())
}

/// Show authentication status.
fn show_status(store: &dyn SecretStore, config: &Config, alias: &str, quiet: bool) -> Result<()> {
    let exists = store.exists(&token_key(alias))?;

    if quiet {
        // Machine-readable output
        if exists {
            println!("authenticated");
        } else {
            println!("not_authenticated");
        }
    } else if exists {
        match config.org(alias) {
            Some(org) => println!("Authenticated with {} ({}).", alias, org.instance_url),
            None => println!("Authenticated with {}.", alias),
        }
        // Note: We intentionally do NOT print the token or any part of it
    } else {
        println!("Not authenticated with {}.", alias);
        println!(
            "Run 'wry auth -u {} --instance-url <URL>' to authenticate.",
            alias
        );
    }

    Ok(())
}

/// Remove stored authentication. The org entry in config is kept.
fn do_logout(store: &dyn SecretStore, alias: &str, verbosity: Verbosity) -> Result<()> {
    store
        .delete(&token_key(alias))
        .context("Failed to remove stored token")?;

    output::success(format!("Logged out from {}.", alias), verbosity);

    Ok(())
}

/// Get token from argument or interactive prompt.
fn get_token(ctx: &Context, token_arg: Option<&str>) -> Result<String> {
    // If token provided via argument, use it
    if let Some(t) = token_arg {
        return Ok(t.to_string());
    }

    // If not interactive, we need the token argument
    if ctx.quiet || !ctx.interactive {
        bail!("Token required. Use --token <TOKEN> or run interactively.");
    }

    // Interactive prompt with masked input
    print!("Access token: ");
    io::stdout().flush()?;

    let token = rpassword::read_password().context("Failed to read token")?;

    if token.is_empty() {
        bail!("Token cannot be empty.");
    }

    Ok(token)
}

/// Validate token format (basic checks).
///
/// We don't validate the token against the org here - that would
/// require network access. We just do basic format validation.
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }

    if token.len() < 10 {
        bail!("Token appears to be too short.");
    }

    // Check for common mistakes
    if token.contains(' ') {
        bail!("Token should not contain spaces.");
    }

    if token.contains('\n') || token.contains('\r') {
        bail!("Token should not contain newlines.");
    }

    Ok(())
}
