//! org
//!
//! Access to a Salesforce org over its REST API.
//!
//! # Architecture
//!
//! The `OrgApi` trait defines the three remote services wry uses: SOQL
//! queries, the global describe listing, and the limits snapshot. Commands
//! obtain a client through [`connect`] rather than constructing
//! [`RestOrg`] themselves, and the domain code in [`crate::core`] only ever
//! sees `&dyn OrgApi`.
//!
//! # Modules
//!
//! - `traits`: Core `OrgApi` trait and payload types
//! - [`rest`]: REST implementation using reqwest
//! - [`mock`]: Mock implementation for deterministic testing
//! - `connect`: Org selection from flags, config, secrets and environment
//!
//! # Example
//!
//! ```ignore
//! use sfwry::org::{connect, EnvOverride};
//!
//! let (target, org) = connect(Some("dev"), &config, store.as_ref(), &EnvOverride::from_env())?;
//! let limits = org.limits().await?;
//! println!("{}: {} limits", target.label(), limits.len());
//! ```

mod connect;
pub mod mock;
pub mod rest;
mod traits;

pub use connect::{
    connect, resolve, ConnectError, EnvOverride, OrgTarget, ENV_ACCESS_TOKEN, ENV_INSTANCE_URL,
};
pub use rest::{RestOrg, DEFAULT_API_VERSION};
pub use traits::*;
