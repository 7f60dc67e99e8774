//! org::mock
//!
//! In-memory org for deterministic testing.
//!
//! # Design
//!
//! Query results are canned per SOQL string. Asking for a query that was
//! never registered is an error, which keeps tests honest about the exact
//! statements a command issues. Every call is recorded for verification.
//!
//! # Example
//!
//! ```
//! use sfwry::org::mock::MockOrg;
//! use sfwry::org::OrgApi;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let org = MockOrg::new().with_query(
//!     "select count(Id) record_count from Contact",
//!     vec![json!({"record_count": 7})],
//! );
//!
//! let rows = org.query("select count(Id) record_count from Contact").await.unwrap();
//! assert_eq!(rows[0]["record_count"], 7);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{LimitEntry, Limits, OrgApi, OrgError, SObjectSummary};

/// Mock org for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockOrg {
    inner: Arc<Mutex<MockOrgInner>>,
}

#[derive(Debug, Default)]
struct MockOrgInner {
    /// Canned rows by exact SOQL text.
    queries: HashMap<String, Vec<serde_json::Value>>,
    sobjects: Vec<SObjectSummary>,
    limits: Limits,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every query with the given error.
    Query(OrgError),
    /// Fail only the query with this exact text.
    QueryText(String, OrgError),
    /// Fail describe_global with the given error.
    DescribeGlobal(OrgError),
    /// Fail limits with the given error.
    Limits(OrgError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Query { soql: String },
    DescribeGlobal,
    Limits,
}

impl MockOrg {
    /// Create an org with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows returned for `soql`.
    pub fn with_query(self, soql: impl Into<String>, rows: Vec<serde_json::Value>) -> Self {
        self.inner.lock().unwrap().queries.insert(soql.into(), rows);
        self
    }

    /// Set the global describe listing.
    pub fn with_sobjects(self, sobjects: Vec<SObjectSummary>) -> Self {
        self.inner.lock().unwrap().sobjects = sobjects;
        self
    }

    /// Add one limit to the snapshot.
    pub fn with_limit(self, name: impl Into<String>, max: i64, remaining: i64) -> Self {
        self.inner
            .lock()
            .unwrap()
            .limits
            .insert(name.into(), LimitEntry { max, remaining });
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use sfwry::org::mock::{MockOrg, FailOn};
    /// use sfwry::org::OrgError;
    ///
    /// let org = MockOrg::new()
    ///     .fail_on(FailOn::Limits(OrgError::NetworkError("offline".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Get the SOQL text of every recorded query, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                MockOperation::Query { soql } => Some(soql),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }
}

#[async_trait]
impl OrgApi for MockOrg {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn query(&self, soql: &str) -> Result<Vec<serde_json::Value>, OrgError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Query {
            soql: soql.to_string(),
        });

        match &inner.fail_on {
            Some(FailOn::Query(err)) => return Err(err.clone()),
            Some(FailOn::QueryText(text, err)) if text == soql => return Err(err.clone()),
            _ => {}
        }

        inner
            .queries
            .get(soql)
            .cloned()
            .ok_or_else(|| OrgError::ApiError {
                status: 400,
                message: format!("MALFORMED_QUERY: no canned result for '{}'", soql),
            })
    }

    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, OrgError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::DescribeGlobal);

        if let Some(FailOn::DescribeGlobal(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner.sobjects.clone())
    }

    async fn limits(&self) -> Result<Limits, OrgError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Limits);

        if let Some(FailOn::Limits(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner.limits.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn canned_query_returns_rows() {
        let org = MockOrg::new().with_query("select Id from User", vec![json!({"Id": "005A"})]);

        let rows = org.query("select Id from User").await.unwrap();
        assert_eq!(rows, vec![json!({"Id": "005A"})]);
        assert_eq!(org.queries(), vec!["select Id from User".to_string()]);
    }

    #[tokio::test]
    async fn unknown_query_is_an_error() {
        let org = MockOrg::new();

        let err = org.query("select Id from Nothing").await.unwrap_err();
        assert!(matches!(err, OrgError::ApiError { status: 400, .. }));
        // The failed call is still recorded
        assert_eq!(org.operations().len(), 1);
    }

    #[tokio::test]
    async fn fail_on_specific_query_only() {
        let org = MockOrg::new()
            .with_query("select Id from A", vec![])
            .with_query("select Id from B", vec![])
            .fail_on(FailOn::QueryText(
                "select Id from B".into(),
                OrgError::NetworkError("reset".into()),
            ));

        assert!(org.query("select Id from A").await.is_ok());
        assert!(matches!(
            org.query("select Id from B").await,
            Err(OrgError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn limits_and_describe_are_recorded() {
        let org = MockOrg::new()
            .with_limit("MassEmail", 10, 10)
            .with_sobjects(vec![SObjectSummary {
                name: "Account".into(),
                ..Default::default()
            }]);

        let limits = org.limits().await.unwrap();
        assert_eq!(limits["MassEmail"].max, 10);
        let sobjects = org.describe_global().await.unwrap();
        assert_eq!(sobjects[0].name, "Account");

        assert_eq!(
            org.operations(),
            vec![MockOperation::Limits, MockOperation::DescribeGlobal]
        );

        org.clear_operations();
        assert!(org.operations().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let org = MockOrg::new().with_limit("SingleEmail", 15, 15);
        let clone = org.clone();

        clone.limits().await.unwrap();
        assert_eq!(org.operations(), vec![MockOperation::Limits]);
    }
}
