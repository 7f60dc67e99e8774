//! cli::commands::replace
//!
//! `wry data replace` and `wry file replace`.
//!
//! Both load the reference data from the org, then mirror the input
//! directory. They differ only in defaults: `data replace` substitutes
//! JSON and CSV files and requires `--outputdir`; `file replace`
//! substitutes JSON files and writes to `<inputdir>.out` by default.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::open_session;
use crate::cli::args::ReplaceArgs;
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::reference::{load_lookup_table, LookupTable};
use crate::core::transform::{transform, TransformEvent, TransformOptions, TransformReport};
use crate::ui::output;

/// Which replace command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceKind {
    Data,
    File,
}

impl ReplaceKind {
    fn default_options(self) -> TransformOptions {
        match self {
            ReplaceKind::Data => TransformOptions::data_replace(),
            ReplaceKind::File => TransformOptions::file_replace(),
        }
    }
}

/// Run a replace command.
pub fn replace(
    ctx: &Context,
    alias: Option<&str>,
    kind: ReplaceKind,
    args: &ReplaceArgs,
    outputdir: Option<&Path>,
) -> Result<()> {
    let output = output_dir(&args.inputdir, outputdir);
    let session = open_session(ctx, alias)?;
    let options = build_options(kind, args, &session.config);

    let rt = tokio::runtime::Runtime::new()?;
    let table = rt
        .block_on(load_lookup_table(session.org.as_ref()))
        .with_context(|| format!("Failed to load reference data from {}", session.target.label()))?;

    run_transform(ctx, &args.inputdir, &output, &table, &options)?;
    Ok(())
}

/// Mirror `input` into `output`, printing progress and the result.
pub fn run_transform(
    ctx: &Context,
    input: &Path,
    output: &Path,
    table: &LookupTable,
    options: &TransformOptions,
) -> Result<TransformReport> {
    let verbosity = ctx.verbosity();
    let mut on_event = |event: &TransformEvent<'_>| {
        if event.is_warning() {
            output::warn(event, verbosity);
        } else {
            output::print(event, verbosity);
        }
    };

    let report = transform(input, output, table, options, &mut on_event)?;

    if ctx.json {
        output::print_json(&report)?;
    } else {
        output::success(
            format!(
                "Replaced {} keys in {} files and copied {} files to {}.",
                report.replacements.len(),
                report.transformed,
                report.copied,
                output.display()
            ),
            verbosity,
        );
    }
    Ok(report)
}

/// Explicit output directory, or `<inputdir>.out`.
fn output_dir(input: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None => {
            // components() drops a trailing separator
            let mut name = input.components().as_path().as_os_str().to_os_string();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Command defaults, then config, then flags.
fn build_options(kind: ReplaceKind, args: &ReplaceArgs, config: &Config) -> TransformOptions {
    let mut options = kind.default_options();
    if !args.extensions.is_empty() {
        options.text_extensions = TransformOptions::with_extensions(&args.extensions).text_extensions;
    } else if let Some(extensions) = config.replace_extensions() {
        options.text_extensions = TransformOptions::with_extensions(extensions).text_extensions;
    }
    options.overwrite = args.force;
    options.keep_unresolved = args.keep_unresolved || config.keep_unresolved();
    options.object_type = args.object_type.clone();
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GlobalConfig, ReplaceDefaults};
    use std::fs;
    use tempfile::TempDir;

    fn args(extensions: &[&str]) -> ReplaceArgs {
        ReplaceArgs {
            inputdir: PathBuf::from("data"),
            force: false,
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            object_type: None,
            keep_unresolved: false,
        }
    }

    fn quiet() -> Context {
        Context {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn default_output_dir() {
        assert_eq!(
            output_dir(Path::new("data"), None),
            PathBuf::from("data.out")
        );
        assert_eq!(
            output_dir(Path::new("fixtures/data/"), None),
            PathBuf::from("fixtures/data.out")
        );
        assert_eq!(
            output_dir(Path::new("data"), Some(Path::new("elsewhere"))),
            PathBuf::from("elsewhere")
        );
    }

    #[test]
    fn options_per_command() {
        let config = Config::default();
        assert_eq!(
            build_options(ReplaceKind::Data, &args(&[]), &config).text_extensions,
            vec!["json", "csv"]
        );
        assert_eq!(
            build_options(ReplaceKind::File, &args(&[]), &config).text_extensions,
            vec!["json"]
        );
    }

    #[test]
    fn flags_override_config() {
        let config = Config::from_global(GlobalConfig {
            replace: Some(ReplaceDefaults {
                extensions: Some(vec!["json".into(), "txt".into()]),
                keep_unresolved: Some(true),
            }),
            ..Default::default()
        });

        let from_config = build_options(ReplaceKind::File, &args(&[]), &config);
        assert_eq!(from_config.text_extensions, vec!["json", "txt"]);
        assert!(from_config.keep_unresolved);

        let from_flags = build_options(ReplaceKind::File, &args(&["csv"]), &config);
        assert_eq!(from_flags.text_extensions, vec!["csv"]);
    }

    #[test]
    fn run_transform_returns_report() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("user.json"), r#"{"UserRoleId": "$R{Role.CEO}"}"#).unwrap();
        let table: LookupTable = [("Role.CEO", "00E1")].into_iter().collect();

        let report = run_transform(
            &quiet(),
            &input,
            &temp.path().join("data.out"),
            &table,
            &TransformOptions::file_replace(),
        )
        .unwrap();

        assert_eq!(report.transformed, 1);
        assert_eq!(report.replacements[0].id, "00E1");
    }
}
