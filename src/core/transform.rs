//! core::transform
//!
//! Mirror an input directory tree into an output tree, substituting
//! placeholders in text files and copying everything else byte for byte.
//!
//! # Traversal
//!
//! Entries are visited sequentially in lexicographic order of file name.
//! Each entry is finished before the next one starts, so output and
//! progress events are deterministic.
//!
//! # Overwrite policy
//!
//! Without `overwrite` the output root must not exist and every file is
//! created with create-new semantics. With `overwrite` existing
//! directories are reused and existing files truncated.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sfwry::core::reference::LookupTable;
//! use sfwry::core::transform::{transform, TransformOptions};
//!
//! let table: LookupTable = [("Role.CEO", "00E1")].into_iter().collect();
//! let report = transform(
//!     Path::new("data"),
//!     Path::new("data.out"),
//!     &table,
//!     &TransformOptions::file_replace(),
//!     &mut |event| println!("{}", event),
//! )?;
//! println!("{} files transformed", report.transformed);
//! # Ok::<(), sfwry::core::transform::TransformError>(())
//! ```

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::reference::LookupTable;
use super::substitute::{substitute, Replacement, ReplacementKind};

/// Text extensions rewritten by `wry data replace`.
pub const DATA_REPLACE_EXTENSIONS: [&str; 2] = ["json", "csv"];

/// Text extensions rewritten by `wry file replace`.
pub const FILE_REPLACE_EXTENSIONS: [&str; 1] = ["json"];

/// Errors from a tree transform. Every variant names the offending path.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input is not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("output already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("output directory {} is inside input directory {}", .output.display(), .input.display())]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8 text", .0.display())]
    NotUtf8(PathBuf),

    #[error("{}: unresolved keys: {} (use --keep-unresolved to leave them in place)", .path.display(), .keys.join(", "))]
    UnresolvedTokens { path: PathBuf, keys: Vec<String> },
}

/// How a transform treats files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Extensions (without dot, lowercase) of files to substitute.
    pub text_extensions: Vec<String>,
    /// Reuse an existing output tree and replace existing files.
    pub overwrite: bool,
    /// Leave unresolved tokens verbatim instead of failing.
    pub keep_unresolved: bool,
    /// Enables the embedded record type rewrite for this object.
    pub object_type: Option<String>,
}

impl TransformOptions {
    /// Defaults for `wry data replace`.
    pub fn data_replace() -> Self {
        Self::with_extensions(DATA_REPLACE_EXTENSIONS)
    }

    /// Defaults for `wry file replace`.
    pub fn file_replace() -> Self {
        Self::with_extensions(FILE_REPLACE_EXTENSIONS)
    }

    /// Options substituting exactly `extensions`.
    ///
    /// Leading dots are stripped and case is ignored.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            text_extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            overwrite: false,
            keep_unresolved: false,
            object_type: None,
        }
    }

    /// Whether `path` is rewritten rather than copied.
    pub fn is_text(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                self.text_extensions
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false)
    }
}

/// A resolved replacement and the file it was made in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReplacement {
    pub file: PathBuf,
    pub kind: ReplacementKind,
    pub key: String,
    pub id: String,
}

/// Keys left in place in a file (only with `keep_unresolved`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUnresolved {
    pub file: PathBuf,
    pub keys: Vec<String>,
}

/// Summary of a completed transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Directories created (existing ones reused under overwrite are not counted)
    pub directories: usize,
    pub transformed: usize,
    pub copied: usize,
    pub replacements: Vec<FileReplacement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<FileUnresolved>,
}

/// Progress notification emitted while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformEvent<'a> {
    /// A text file is about to be rewritten.
    Processing { from: &'a Path, to: &'a Path },
    /// A file is about to be copied verbatim.
    Copying { from: &'a Path, to: &'a Path },
    /// A key was resolved in `file`.
    Replaced {
        file: &'a Path,
        replacement: &'a Replacement,
    },
    /// Keys were left unresolved in `file`.
    Unresolved { file: &'a Path, keys: &'a [String] },
}

impl TransformEvent<'_> {
    /// Whether this event should be shown as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, TransformEvent::Unresolved { .. })
    }
}

impl fmt::Display for TransformEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformEvent::Processing { from, to } => {
                write!(f, "Processing: {} to {}", from.display(), to.display())
            }
            TransformEvent::Copying { from, to } => {
                write!(f, "Copying: {} to {}", from.display(), to.display())
            }
            TransformEvent::Replaced { file, replacement } => {
                let tag = match replacement.kind {
                    ReplacementKind::Token => "R",
                    ReplacementKind::RecordType => "RTDN",
                };
                write!(
                    f,
                    "{}: replace:{}: \"{}\": {}",
                    file.display(),
                    tag,
                    replacement.key,
                    replacement.id
                )
            }
            TransformEvent::Unresolved { file, keys } => {
                write!(f, "{}: unresolved: {}", file.display(), keys.join(", "))
            }
        }
    }
}

/// Mirror `input` into `output`.
///
/// # Errors
///
/// The first failure aborts the walk. Output written before the failure
/// is left in place.
pub fn transform(
    input: &Path,
    output: &Path,
    table: &LookupTable,
    options: &TransformOptions,
    on_event: &mut dyn FnMut(&TransformEvent<'_>),
) -> Result<TransformReport, TransformError> {
    if !input.exists() {
        return Err(TransformError::InputNotFound(input.to_path_buf()));
    }
    if !input.is_dir() {
        return Err(TransformError::InputNotDirectory(input.to_path_buf()));
    }
    if output.exists() && !options.overwrite {
        return Err(TransformError::AlreadyExists(output.to_path_buf()));
    }
    reject_nested_output(input, output)?;

    tracing::debug!(input = %input.display(), output = %output.display(), "starting transform");

    let mut walker = Walker {
        table,
        options,
        on_event,
        report: TransformReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            ..Default::default()
        },
    };
    walker.directory(input, output)?;
    Ok(walker.report)
}

/// Writing into the tree being read would recurse forever.
fn reject_nested_output(input: &Path, output: &Path) -> Result<(), TransformError> {
    let read_err = |path: &Path, source| TransformError::Read {
        path: path.to_path_buf(),
        source,
    };
    let input_abs = fs::canonicalize(input).map_err(|e| read_err(input, e))?;
    let output_abs = resolve_absolute(output).map_err(|e| read_err(output, e))?;
    if output_abs.starts_with(&input_abs) {
        return Err(TransformError::OutputInsideInput {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and append the rest.
fn resolve_absolute(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        return fs::canonicalize(path);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut missing = Vec::new();
    let mut cursor = absolute.as_path();
    while !cursor.exists() {
        match (cursor.file_name(), cursor.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                cursor = parent;
            }
            _ => break,
        }
    }
    let mut resolved = fs::canonicalize(cursor)?;
    for name in missing.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

struct Walker<'a> {
    table: &'a LookupTable,
    options: &'a TransformOptions,
    on_event: &'a mut dyn FnMut(&TransformEvent<'_>),
    report: TransformReport,
}

impl Walker<'_> {
    fn directory(&mut self, input: &Path, output: &Path) -> Result<(), TransformError> {
        match fs::create_dir(output) {
            Ok(()) => self.report.directories += 1,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if !(self.options.overwrite && output.is_dir()) {
                    return Err(TransformError::AlreadyExists(output.to_path_buf()));
                }
            }
            Err(source) => {
                return Err(TransformError::CreateDir {
                    path: output.to_path_buf(),
                    source,
                })
            }
        }

        let read_err = |source| TransformError::Read {
            path: input.to_path_buf(),
            source,
        };
        let mut entries = fs::read_dir(input)
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let from = entry.path();
            let to = output.join(entry.file_name());
            // Follows symlinks, like stat
            let metadata = fs::metadata(&from).map_err(|source| TransformError::Read {
                path: from.clone(),
                source,
            })?;

            if metadata.is_dir() {
                self.directory(&from, &to)?;
            } else if self.options.is_text(&from) {
                self.text_file(&from, &to)?;
            } else {
                self.copy_file(&from, &to)?;
            }
        }
        Ok(())
    }

    fn text_file(&mut self, from: &Path, to: &Path) -> Result<(), TransformError> {
        (self.on_event)(&TransformEvent::Processing { from, to });

        let bytes = fs::read(from).map_err(|source| TransformError::Read {
            path: from.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| TransformError::NotUtf8(from.to_path_buf()))?;

        let result = substitute(&text, self.table, self.options.object_type.as_deref());

        let mut unresolved: Vec<String> = Vec::new();
        for key in result.unresolved {
            if !unresolved.contains(&key) {
                unresolved.push(key);
            }
        }
        if !unresolved.is_empty() && !self.options.keep_unresolved {
            return Err(TransformError::UnresolvedTokens {
                path: from.to_path_buf(),
                keys: unresolved,
            });
        }

        let mut file = self.create_output(to)?;
        io::Write::write_all(&mut file, result.text.as_bytes()).map_err(|source| {
            TransformError::Write {
                path: to.to_path_buf(),
                source,
            }
        })?;

        for replacement in &result.replacements {
            (self.on_event)(&TransformEvent::Replaced {
                file: from,
                replacement,
            });
        }
        if !unresolved.is_empty() {
            (self.on_event)(&TransformEvent::Unresolved {
                file: from,
                keys: &unresolved,
            });
            self.report.unresolved.push(FileUnresolved {
                file: from.to_path_buf(),
                keys: unresolved,
            });
        }

        self.report
            .replacements
            .extend(result.replacements.into_iter().map(|r| FileReplacement {
                file: from.to_path_buf(),
                kind: r.kind,
                key: r.key,
                id: r.id,
            }));
        self.report.transformed += 1;
        Ok(())
    }

    fn copy_file(&mut self, from: &Path, to: &Path) -> Result<(), TransformError> {
        (self.on_event)(&TransformEvent::Copying { from, to });

        let mut source = File::open(from).map_err(|source| TransformError::Read {
            path: from.to_path_buf(),
            source,
        })?;
        let mut dest = self.create_output(to)?;
        io::copy(&mut source, &mut dest).map_err(|source| TransformError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;

        self.report.copied += 1;
        Ok(())
    }

    fn create_output(&self, to: &Path) -> Result<File, TransformError> {
        let mut open = OpenOptions::new();
        open.write(true);
        if self.options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        open.open(to).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                TransformError::AlreadyExists(to.to_path_buf())
            } else {
                TransformError::Write {
                    path: to.to_path_buf(),
                    source,
                }
            }
        })
    }
}
