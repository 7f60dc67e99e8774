//! org::connect
//!
//! Org selection and client creation.
//!
//! # Resolution
//!
//! 1. `WRY_INSTANCE_URL` + `WRY_ACCESS_TOKEN` in the environment win over
//!    everything (CI and scripted use).
//! 2. Otherwise the alias given with `--targetusername`, or the configured
//!    `default_org`, is looked up: the instance URL comes from config and
//!    the token from the secret store.
//!
//! Commands call [`connect`] rather than constructing [`RestOrg`] directly.

use thiserror::Error;

use super::rest::RestOrg;
use super::traits::OrgApi;
use crate::core::config::schema::validate_instance_url;
use crate::core::config::Config;
use crate::secrets::{token_key, SecretError, SecretStore};

/// Environment variable overriding the instance URL.
pub const ENV_INSTANCE_URL: &str = "WRY_INSTANCE_URL";

/// Environment variable overriding the access token.
pub const ENV_ACCESS_TOKEN: &str = "WRY_ACCESS_TOKEN";

/// Errors resolving which org to talk to.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no target org: pass --targetusername <alias> or set default_org in config")]
    NoTargetOrg,

    #[error("org '{0}' is not configured. Run 'wry auth -u {0} --instance-url <url>'.")]
    UnknownOrg(String),

    #[error("not authenticated for org '{0}'. Run 'wry auth -u {0}'.")]
    NotAuthenticated(String),

    #[error("{ENV_INSTANCE_URL} and {ENV_ACCESS_TOKEN} must be set together")]
    PartialEnvironment,

    #[error("invalid instance URL: {0}")]
    InvalidInstanceUrl(String),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Connection values taken from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverride {
    pub instance_url: Option<String>,
    pub access_token: Option<String>,
}

impl EnvOverride {
    /// Read the override variables from the process environment.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            instance_url: read(ENV_INSTANCE_URL),
            access_token: read(ENV_ACCESS_TOKEN),
        }
    }
}

/// A fully resolved connection target.
#[derive(Clone, PartialEq, Eq)]
pub struct OrgTarget {
    /// Alias the target was resolved from (`None` for environment targets)
    pub alias: Option<String>,
    pub instance_url: String,
    pub api_version: String,
    access_token: String,
}

// Custom Debug to avoid exposing the access token
impl std::fmt::Debug for OrgTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgTarget")
            .field("alias", &self.alias)
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl OrgTarget {
    /// Human-readable label for progress output.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.instance_url)
    }

    /// Build the REST client for this target.
    pub fn into_client(self) -> RestOrg {
        RestOrg::new(self.instance_url, self.access_token).with_api_version(self.api_version)
    }
}

/// Resolve the target org without creating a client.
///
/// # Errors
///
/// See [`ConnectError`]. Secret store failures are propagated.
pub fn resolve(
    alias: Option<&str>,
    config: &Config,
    store: &dyn SecretStore,
    env: &EnvOverride,
) -> Result<OrgTarget, ConnectError> {
    match (&env.instance_url, &env.access_token) {
        (Some(url), Some(token)) => {
            validate_instance_url(url)
                .map_err(|_| ConnectError::InvalidInstanceUrl(url.clone()))?;
            tracing::debug!(instance_url = %url, "using org from environment");
            return Ok(OrgTarget {
                alias: None,
                instance_url: url.clone(),
                api_version: config.api_version(alias).to_string(),
                access_token: token.clone(),
            });
        }
        (Some(_), None) | (None, Some(_)) => return Err(ConnectError::PartialEnvironment),
        (None, None) => {}
    }

    let alias = alias
        .or_else(|| config.default_org())
        .ok_or(ConnectError::NoTargetOrg)?;
    let org = config
        .org(alias)
        .ok_or_else(|| ConnectError::UnknownOrg(alias.to_string()))?;
    let token = store
        .get(&token_key(alias))?
        .ok_or_else(|| ConnectError::NotAuthenticated(alias.to_string()))?;

    tracing::debug!(alias, instance_url = %org.instance_url, "using configured org");
    Ok(OrgTarget {
        alias: Some(alias.to_string()),
        instance_url: org.instance_url.clone(),
        api_version: config.api_version(Some(alias)).to_string(),
        access_token: token,
    })
}

/// Resolve the target org and create its client.
pub fn connect(
    alias: Option<&str>,
    config: &Config,
    store: &dyn SecretStore,
    env: &EnvOverride,
) -> Result<(OrgTarget, Box<dyn OrgApi>), ConnectError> {
    let target = resolve(alias, config, store, env)?;
    let client = target.clone().into_client();
    Ok((target, Box::new(client)))
}
