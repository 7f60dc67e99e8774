//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! wry has two configuration scopes:
//! - **Global**: user-level settings, including known orgs
//! - **Project**: per-directory defaults (`.wry/config.toml`)
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$WRY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/wry/config.toml`
//! 3. `~/.wry/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use sfwry::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("."))).unwrap();
//! let config = result.config;
//!
//! if let Some(alias) = config.default_org() {
//!     println!("Default org: {}", alias);
//! }
//! println!("Excluded objects: {:?}", config.count_exclude());
//! ```

pub mod schema;

pub use schema::{
    CountDefaults, GlobalConfig, OrgConfig, ProjectConfig, ReplaceDefaults, SecretsConfig,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::org::DEFAULT_API_VERSION;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "WRY_CONFIG";

/// Objects always skipped when counting ALL objects.
pub const DEFAULT_COUNT_EXCLUDES: [&str; 2] = ["CollaborationGroupRecord", "FeedItem"];

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if present)
    pub project: Option<ProjectConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the project config file (if loaded)
    project_path: Option<PathBuf>,
}

impl Config {
    /// Build an in-memory config from global settings only.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self {
            global,
            ..Default::default()
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads `<project_dir>/.wry/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// contain invalid values. Missing files are not an error.
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = Self::load_global()?;
        Self::assemble(global, global_path, project_dir)
    }

    /// Load configuration using an explicit global config file.
    ///
    /// A missing file yields default global settings.
    pub fn load_with_global(
        global_path: &Path,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let (global, path) = if global_path.exists() {
            (
                Self::read_toml::<GlobalConfig>(global_path)?,
                Some(global_path.to_path_buf()),
            )
        } else {
            (GlobalConfig::default(), None)
        };
        Self::assemble(global, path, project_dir)
    }

    fn assemble(
        global: GlobalConfig,
        global_path: Option<PathBuf>,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (project, project_path) = match project_dir {
            Some(dir) => Self::load_project(dir)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        // A project default pointing at an unknown org is likely a typo,
        // but env-based connections still work, so only warn.
        if let (Some(p), Some(path)) = (&project, &project_path) {
            if let Some(alias) = &p.default_org {
                if !global.orgs.contains_key(alias) {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "default_org '{}' is not configured; run 'wry auth -u {} --instance-url <url>'",
                            alias, alias
                        ),
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $WRY_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/wry/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("wry/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.wry/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".wry/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Load project configuration from `<dir>/.wry/config.toml`.
    fn load_project(dir: &Path) -> Result<(Option<ProjectConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::project_config_path(dir);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_toml(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Read and parse a TOML config file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `$WRY_CONFIG` when set, otherwise `~/.wry/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".wry/config.toml"))
    }

    /// Get the path for project config under `dir`.
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(".wry/config.toml")
    }

    /// Write global config atomically to `path`.
    ///
    /// Creates parent directories if needed.
    pub fn write_global(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        config.validate()?;
        Self::write_config_atomic(path, config)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Temp file in the same directory so the rename is atomic
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the default org alias (project overrides global).
    pub fn default_org(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.default_org.as_deref())
            .or(self.global.default_org.as_deref())
    }

    /// Get the connection details for an org alias.
    pub fn org(&self, alias: &str) -> Option<&OrgConfig> {
        self.global.orgs.get(alias)
    }

    /// Get the API version for an org alias.
    ///
    /// Org override, then global setting, then [`DEFAULT_API_VERSION`].
    pub fn api_version(&self, alias: Option<&str>) -> &str {
        alias
            .and_then(|a| self.org(a))
            .and_then(|o| o.api_version.as_deref())
            .or(self.global.api_version.as_deref())
            .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Get the configured text extensions for replace, if any.
    pub fn replace_extensions(&self) -> Option<&[String]> {
        self.project
            .as_ref()
            .and_then(|p| p.replace.as_ref())
            .and_then(|r| r.extensions.as_deref())
            .or_else(|| {
                self.global
                    .replace
                    .as_ref()
                    .and_then(|r| r.extensions.as_deref())
            })
    }

    /// Check if unresolved tokens should be kept instead of failing.
    ///
    /// Defaults to `false`.
    pub fn keep_unresolved(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.replace.as_ref())
            .and_then(|r| r.keep_unresolved)
            .or_else(|| {
                self.global
                    .replace
                    .as_ref()
                    .and_then(|r| r.keep_unresolved)
            })
            .unwrap_or(false)
    }

    /// Get the objects skipped when counting ALL objects.
    ///
    /// Always contains [`DEFAULT_COUNT_EXCLUDES`], plus configured extras
    /// from both scopes.
    pub fn count_exclude(&self) -> Vec<String> {
        let mut excludes: Vec<String> =
            DEFAULT_COUNT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        let extras = [
            self.global.count.as_ref(),
            self.project.as_ref().and_then(|p| p.count.as_ref()),
        ];
        for name in extras
            .into_iter()
            .flatten()
            .filter_map(|c| c.exclude.as_ref())
            .flatten()
        {
            if !excludes.contains(name) {
                excludes.push(name.clone());
            }
        }
        excludes
    }

    /// Get the secrets provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
