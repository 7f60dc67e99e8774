//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Results only, no progress lines
//! - `--json`: Print the command's result as JSON
//! - `--interactive` / `--no-interactive`: Control prompts

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// wry - Salesforce org reference data and fixture placeholder substitution
#[derive(Parser, Debug)]
#[command(name = "wry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Results only, no progress; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable interactive prompts
    #[arg(
        long = "interactive",
        global = true,
        conflicts_with = "no_interactive"
    )]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - None of `--no-interactive`, `--quiet`, `--json` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet || self.json {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reference data substitution and record counts
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Fixture file substitution
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Org information
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Store or inspect credentials for an org alias
    #[command(
        name = "auth",
        long_about = "Store an access token and instance URL under an org alias.\n\n\
            wry does not run OAuth flows. Obtain an access token with your usual \
            tooling and register it here; commands then select the org with \
            -u <alias>. The token is kept in the secret store, the instance URL in \
            the global config file.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Register an org (prompts for the token)
    wry auth -u dev --instance-url https://acme--dev.sandbox.my.salesforce.com

    # Non-interactive
    wry auth -u dev --instance-url https://acme.my.salesforce.com --token \"$SF_TOKEN\"

    # Check whether a token is stored
    wry auth -u dev --status

    # Remove the stored token
    wry auth -u dev --logout"
    )]
    Auth {
        /// Org alias
        #[arg(short = 'u', long = "targetusername", value_name = "ALIAS")]
        alias: String,

        /// Instance URL (required the first time an alias is registered)
        #[arg(long, value_name = "URL")]
        instance_url: Option<String>,

        /// Access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// REST API version for this org, e.g. 59.0
        #[arg(long, value_name = "VERSION")]
        api_version: Option<String>,

        /// Show current authentication status
        #[arg(long, conflicts_with = "logout")]
        status: bool,

        /// Remove stored authentication
        #[arg(long)]
        logout: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// `wry data` subcommands
#[derive(Subcommand, Debug)]
pub enum DataAction {
    /// Copy a data directory, replacing $R{...} keys in JSON and CSV files
    #[command(
        name = "replace",
        after_help = "\
WORKFLOW EXAMPLES:
    wry data replace -u dev -i data -o data.replaced

    # Also rewrite embedded RecordType references for Account fixtures
    wry data replace -u dev -i accounts -o accounts.out --object-type Account"
    )]
    Replace {
        #[command(flatten)]
        org: OrgArg,

        #[command(flatten)]
        replace: ReplaceArgs,

        /// Output directory (must not exist unless --force)
        #[arg(short = 'o', long = "outputdir", value_name = "DIR")]
        outputdir: PathBuf,
    },

    /// Count records per object and record type
    #[command(
        name = "count",
        after_help = "\
WORKFLOW EXAMPLES:
    wry data count -u dev -o Account,Opportunity,User
    wry data count -u dev -o ALL"
    )]
    Count {
        #[command(flatten)]
        org: OrgArg,

        /// Comma-separated object names, or ALL
        #[arg(short = 'o', long = "objects", value_name = "OBJECTS")]
        objects: Option<String>,
    },
}

/// `wry file` subcommands
#[derive(Subcommand, Debug)]
pub enum FileAction {
    /// Copy a directory, replacing $R{...} keys in JSON files
    #[command(
        name = "replace",
        after_help = "\
WORKFLOW EXAMPLES:
    # Writes to data.out
    wry file replace -u dev -i data

    wry file replace -u dev -i data -o data.replaced --force"
    )]
    Replace {
        #[command(flatten)]
        org: OrgArg,

        #[command(flatten)]
        replace: ReplaceArgs,

        /// Output directory (defaults to <inputdir>.out)
        #[arg(short = 'o', long = "outputdir", value_name = "DIR")]
        outputdir: Option<PathBuf>,
    },
}

/// `wry org` subcommands
#[derive(Subcommand, Debug)]
pub enum OrgAction {
    /// Show remaining and maximum org limits
    #[command(
        name = "limits",
        after_help = "\
WORKFLOW EXAMPLES:
    wry org limits -u dev
    wry org limits -u dev -l DailyApiRequests,DataStorageMB"
    )]
    Limits {
        #[command(flatten)]
        org: OrgArg,

        /// Comma-separated limit names, or ALL
        #[arg(short = 'l', long = "limits", value_name = "LIMITS")]
        limits: Option<String>,
    },
}

/// Target org selection shared by every org command.
#[derive(Args, Debug, Clone, Default)]
pub struct OrgArg {
    /// Org alias (defaults to the configured default_org)
    #[arg(short = 'u', long = "targetusername", value_name = "ALIAS")]
    pub target: Option<String>,
}

/// Flags shared by `data replace` and `file replace`.
#[derive(Args, Debug, Clone)]
pub struct ReplaceArgs {
    /// Input directory
    #[arg(short = 'i', long = "inputdir", value_name = "DIR")]
    pub inputdir: PathBuf,

    /// Reuse an existing output directory and overwrite files
    #[arg(short = 'f', long)]
    pub force: bool,

    /// File extensions to substitute, comma-separated
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Rewrite embedded RecordType references using this object's record types
    #[arg(long = "object-type", value_name = "SOBJECT")]
    pub object_type: Option<String>,

    /// Leave unknown keys in place instead of failing
    #[arg(long)]
    pub keep_unresolved: bool,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_data_replace() {
        let cli = Cli::try_parse_from([
            "wry",
            "data",
            "replace",
            "-u",
            "dev",
            "-i",
            "in",
            "-o",
            "out",
            "--extensions",
            "json,csv,txt",
            "-f",
        ])
        .unwrap();

        match cli.command {
            Command::Data {
                action:
                    DataAction::Replace {
                        org,
                        replace,
                        outputdir,
                    },
            } => {
                assert_eq!(org.target.as_deref(), Some("dev"));
                assert_eq!(replace.inputdir, PathBuf::from("in"));
                assert_eq!(outputdir, PathBuf::from("out"));
                assert_eq!(replace.extensions, vec!["json", "csv", "txt"]);
                assert!(replace.force);
                assert!(!replace.keep_unresolved);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn data_replace_requires_outputdir() {
        assert!(Cli::try_parse_from(["wry", "data", "replace", "-i", "in"]).is_err());
    }

    #[test]
    fn file_replace_outputdir_optional() {
        let cli = Cli::try_parse_from(["wry", "file", "replace", "-i", "in"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::File {
                action: FileAction::Replace {
                    outputdir: None,
                    ..
                }
            }
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wry", "org", "limits", "-l", "Foo", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(!cli.interactive());
    }

    #[test]
    fn auth_requires_alias() {
        assert!(Cli::try_parse_from(["wry", "auth", "--status"]).is_err());
        assert!(Cli::try_parse_from(["wry", "auth", "-u", "dev", "--status", "--logout"]).is_err());
    }
}
