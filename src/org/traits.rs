//! org::traits
//!
//! `OrgApi` trait definition and the payload types it exchanges.
//!
//! # Design
//!
//! The trait is async because every operation is a network round trip.
//! It exposes exactly the three remote services the commands need: SOQL
//! query execution, the global describe listing, and the limits snapshot.
//! Query rows come back as raw JSON values; [`query_as`] decodes them into
//! a typed row at the call site so the trait stays object-safe.
//!
//! # Example
//!
//! ```ignore
//! use sfwry::org::{query_as, OrgApi, OrgError};
//!
//! #[derive(serde::Deserialize)]
//! struct Row { record_count: u64 }
//!
//! async fn count(org: &dyn OrgApi) -> Result<u64, OrgError> {
//!     let rows: Vec<Row> = query_as(org, "select count(Id) record_count from Account").await?;
//!     Ok(rows.iter().map(|r| r.record_count).sum())
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from org operations.
#[derive(Debug, Clone, Error)]
pub enum OrgError {
    /// No access token is available for the org.
    #[error("authentication required")]
    AuthRequired,

    /// The token was rejected or lacks permission.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The org returned an error response.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the org (`errorCode: message`)
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// One entry of the global describe listing (`/sobjects`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SObjectSummary {
    /// API name of the object (e.g. `Account`)
    pub name: String,
    #[serde(default)]
    pub queryable: bool,
    #[serde(default)]
    pub layoutable: bool,
    #[serde(default)]
    pub retrieveable: bool,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub triggerable: bool,
}

impl SObjectSummary {
    /// Whether the object carries ordinary business rows worth counting.
    pub fn is_countable(&self) -> bool {
        self.queryable && self.layoutable && self.retrieveable && self.triggerable
    }
}

/// A single org limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitEntry {
    #[serde(rename = "Max")]
    pub max: i64,
    #[serde(rename = "Remaining")]
    pub remaining: i64,
}

/// The limits snapshot keyed by limit name.
pub type Limits = BTreeMap<String, LimitEntry>;

/// Access to a single Salesforce org.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a client can be shared across
/// async tasks.
///
/// # Error Handling
///
/// Every method returns `Result<T, OrgError>`. Callers treat all of these as
/// fatal for the running command.
#[async_trait]
pub trait OrgApi: Send + Sync {
    /// Short name of the implementation (e.g. "rest", "mock").
    fn name(&self) -> &'static str;

    /// Execute a SOQL query and return every record.
    ///
    /// Implementations follow pagination until the result set is exhausted.
    /// Each record is returned as the raw JSON object the org sent.
    async fn query(&self, soql: &str) -> Result<Vec<serde_json::Value>, OrgError>;

    /// Fetch the global describe listing.
    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, OrgError>;

    /// Fetch the current limits snapshot.
    async fn limits(&self) -> Result<Limits, OrgError>;
}

/// Execute a query and decode every record into `T`.
///
/// # Errors
///
/// Returns the query error, or `OrgError::Decode` naming the query if a
/// record does not match `T`.
pub async fn query_as<T: DeserializeOwned>(
    org: &dyn OrgApi,
    soql: &str,
) -> Result<Vec<T>, OrgError> {
    let records = org.query(soql).await?;
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|e| OrgError::Decode(format!("{}: {}", soql, e)))
        })
        .collect()
}
