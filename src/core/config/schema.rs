//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$WRY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/wry/config.toml`
//! 3. `~/.wry/config.toml` (canonical write location)
//!
//! # Project Config
//!
//! Located at `.wry/config.toml` under the working directory. It may only
//! carry per-project defaults; org connection details stay global.
//!
//! # Validation
//!
//! Config values are validated after parsing (instance URLs, API versions,
//! extension lists, secret provider names).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_org = "dev"
/// api_version = "60.0"
///
/// [orgs.dev]
/// instance_url = "https://acme--dev.sandbox.my.salesforce.com"
///
/// [replace]
/// extensions = ["json", "csv"]
///
/// [count]
/// exclude = ["ContentDocument"]
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Org alias used when `--targetusername` is omitted
    pub default_org: Option<String>,

    /// API version for orgs that do not set their own
    pub api_version: Option<String>,

    /// Known orgs by alias
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub orgs: BTreeMap<String, OrgConfig>,

    /// Replace defaults
    pub replace: Option<ReplaceDefaults>,

    /// Count defaults
    pub count: Option<CountDefaults>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(version) = &self.api_version {
            validate_api_version(version)?;
        }

        for (alias, org) in &self.orgs {
            validate_alias(alias)?;
            org.validate()?;
        }

        if let Some(replace) = &self.replace {
            replace.validate()?;
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }

        Ok(())
    }
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// default_org = "qa"
///
/// [replace]
/// extensions = ["json"]
/// keep_unresolved = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Org alias used when `--targetusername` is omitted
    pub default_org: Option<String>,

    /// Replace defaults
    pub replace: Option<ReplaceDefaults>,

    /// Count defaults
    pub count: Option<CountDefaults>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(alias) = &self.default_org {
            validate_alias(alias)?;
        }
        if let Some(replace) = &self.replace {
            replace.validate()?;
        }
        Ok(())
    }
}

/// Connection details for one org.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OrgConfig {
    /// Base URL, e.g. `https://acme.my.salesforce.com`
    pub instance_url: String,

    /// API version override for this org
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl OrgConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_instance_url(&self.instance_url)?;
        if let Some(version) = &self.api_version {
            validate_api_version(version)?;
        }
        Ok(())
    }
}

/// Defaults for `data replace` / `file replace`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReplaceDefaults {
    /// File extensions treated as text (without the leading dot)
    pub extensions: Option<Vec<String>>,

    /// Leave unresolved tokens in place instead of failing
    pub keep_unresolved: Option<bool>,
}

impl ReplaceDefaults {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(extensions) = &self.extensions {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "replace.extensions must not be empty".into(),
                ));
            }
            for ext in extensions {
                let trimmed = ext.trim_start_matches('.');
                if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid extension '{}' in replace.extensions",
                        ext
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Defaults for `data count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CountDefaults {
    /// Extra objects skipped when counting ALL objects
    pub exclude: Option<Vec<String>>,
}

/// Secret storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider name: "file" or "keychain"
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if provider != "file" && provider != "keychain" {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: file, keychain",
                    provider
                )));
            }
        }
        Ok(())
    }
}

/// Validate an org alias.
///
/// Aliases become part of secret keys (`org.<alias>.token`) and TOML table
/// names, so they are restricted to a conservative character set.
pub fn validate_alias(alias: &str) -> Result<(), ConfigError> {
    let valid = !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid org alias '{}': use letters, digits, '-', '_', '.', '@'",
            alias
        )))
    }
}

/// Validate an instance URL (`http://` is accepted for local test servers).
pub fn validate_instance_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(ConfigError::InvalidValue(format!(
            "invalid instance URL '{}': expected https://<host>",
            url
        ))),
    }
}

/// Validate an API version such as `59.0`.
pub fn validate_api_version(version: &str) -> Result<(), ConfigError> {
    let valid = match version.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid API version '{}': expected e.g. 59.0",
            version
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(
            r#"
            default_org = "dev"
            api_version = "60.0"

            [orgs.dev]
            instance_url = "https://acme--dev.sandbox.my.salesforce.com"

            [orgs.prod]
            instance_url = "https://acme.my.salesforce.com"
            api_version = "58.0"

            [replace]
            extensions = ["json", "csv"]
            "#,
        )
        .unwrap();

        assert_eq!(config.default_org.as_deref(), Some("dev"));
        assert_eq!(config.orgs.len(), 2);
        assert_eq!(config.orgs["prod"].api_version.as_deref(), Some("58.0"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn project_config_rejects_orgs_table() {
        let result: Result<ProjectConfig, _> = toml::from_str(
            r#"
            [orgs.dev]
            instance_url = "https://x.my.salesforce.com"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn alias_validation() {
        assert!(validate_alias("dev").is_ok());
        assert!(validate_alias("admin@acme.com.dev").is_ok());
        assert!(validate_alias("my_org-2").is_ok());
        assert!(validate_alias("").is_err());
        assert!(validate_alias("has space").is_err());
        assert!(validate_alias("a/b").is_err());
    }

    #[test]
    fn instance_url_validation() {
        assert!(validate_instance_url("https://acme.my.salesforce.com").is_ok());
        assert!(validate_instance_url("http://127.0.0.1:8080").is_ok());
        assert!(validate_instance_url("acme.my.salesforce.com").is_err());
        assert!(validate_instance_url("https://").is_err());
        assert!(validate_instance_url("ftp://acme").is_err());
    }

    #[test]
    fn api_version_validation() {
        assert!(validate_api_version("59.0").is_ok());
        assert!(validate_api_version("60.1").is_ok());
        assert!(validate_api_version("59").is_err());
        assert!(validate_api_version("v59.0").is_err());
        assert!(validate_api_version("59.").is_err());
    }

    #[test]
    fn replace_extensions_validation() {
        let ok = ReplaceDefaults {
            extensions: Some(vec!["json".into(), ".csv".into()]),
            keep_unresolved: None,
        };
        assert!(ok.validate().is_ok());

        let empty = ReplaceDefaults {
            extensions: Some(vec![]),
            keep_unresolved: None,
        };
        assert!(empty.validate().is_err());

        let dot_only = ReplaceDefaults {
            extensions: Some(vec![".".into()]),
            keep_unresolved: None,
        };
        assert!(dot_only.validate().is_err());
    }

    #[test]
    fn secrets_provider_validation() {
        let bad = SecretsConfig {
            provider: Some("vault".into()),
        };
        assert!(bad.validate().is_err());

        let good = SecretsConfig {
            provider: Some("keychain".into()),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn serialize_skips_empty_orgs() {
        let config = GlobalConfig {
            default_org: Some("dev".into()),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("default_org"));
        assert!(!text.contains("orgs"));
    }
}
