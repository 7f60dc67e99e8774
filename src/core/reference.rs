//! core::reference
//!
//! Reference-data loader: active record types and user roles keyed by
//! their portable names.
//!
//! # Keys
//!
//! - `RecordType.<SObjectType>.<DeveloperName>`
//! - `Role.<DeveloperName>`
//!
//! Record types are inserted first and roles second. The prefixes never
//! collide; within one prefix the last row wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::org::{query_as, OrgApi, OrgError};

/// Query for every active record type.
pub const RECORD_TYPE_QUERY: &str = "Select Id, SobjectType, DeveloperName from RecordType where IsActive=true order by SObjectType, DeveloperName";

/// Query for every user role.
pub const USER_ROLE_QUERY: &str = "select Id, DeveloperName from UserRole order by DeveloperName";

/// A row of [`RECORD_TYPE_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordTypeRow {
    pub id: String,
    pub sobject_type: String,
    pub developer_name: String,
}

/// A row of [`USER_ROLE_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRoleRow {
    pub id: String,
    pub developer_name: String,
}

/// Key for a record type.
pub fn record_type_key(sobject_type: &str, developer_name: &str) -> String {
    format!("RecordType.{}.{}", sobject_type, developer_name)
}

/// Key for a user role.
pub fn role_key(developer_name: &str) -> String {
    format!("Role.{}", developer_name)
}

/// Key to record id mapping, built once per command and read-only after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LookupTable {
    entries: BTreeMap<String, String>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from query rows, record types before roles.
    pub fn from_rows(record_types: &[RecordTypeRow], roles: &[UserRoleRow]) -> Self {
        let mut table = Self::new();
        for rt in record_types {
            table.insert(record_type_key(&rt.sobject_type, &rt.developer_name), &rt.id);
        }
        for role in roles {
            table.insert(role_key(&role.developer_name), &role.id);
        }
        table
    }

    /// Insert or replace a mapping.
    pub fn insert(&mut self, key: impl Into<String>, id: impl Into<String>) {
        self.entries.insert(key.into(), id.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Load every active record type.
pub async fn load_record_types(org: &dyn OrgApi) -> Result<Vec<RecordTypeRow>, OrgError> {
    query_as(org, RECORD_TYPE_QUERY).await
}

/// Run both reference queries, in order, and build the lookup table.
///
/// # Errors
///
/// Any query failure is returned as-is; no partial table is produced.
pub async fn load_lookup_table(org: &dyn OrgApi) -> Result<LookupTable, OrgError> {
    let record_types = load_record_types(org).await?;
    let roles: Vec<UserRoleRow> = query_as(org, USER_ROLE_QUERY).await?;
    tracing::debug!(
        record_types = record_types.len(),
        roles = roles.len(),
        "loaded reference data"
    );
    Ok(LookupTable::from_rows(&record_types, &roles))
}
