//! core::limits
//!
//! Org-limits reporter.

use std::fmt;

use serde::Serialize;

use super::selection::Selection;
use crate::org::{Limits, OrgApi, OrgError};

/// Header line printed before the limits.
pub const HEADER: &str = "Limit: REMAINING of MAXIMUM";

/// One line of the limits report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LimitLine {
    Known {
        name: String,
        remaining: i64,
        max: i64,
    },
    /// A requested name the org does not report.
    Unknown { name: String },
}

impl fmt::Display for LimitLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitLine::Known {
                name,
                remaining,
                max,
            } => write!(f, "{}: {} of {}", name, remaining, max),
            LimitLine::Unknown { name } => write!(f, "Error: unknown limit: {}", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LimitsReport {
    pub lines: Vec<LimitLine>,
}

impl LimitsReport {
    /// Whether any requested name was unknown.
    pub fn has_unknown(&self) -> bool {
        self.lines
            .iter()
            .any(|l| matches!(l, LimitLine::Unknown { .. }))
    }
}

/// Select lines from a snapshot.
///
/// `All` lists every limit by name; a named selection keeps the requested
/// order and reports unknown names in place.
pub fn build_report(limits: &Limits, selection: &Selection) -> LimitsReport {
    let line = |name: &str| match limits.get(name) {
        Some(entry) => LimitLine::Known {
            name: name.to_string(),
            remaining: entry.remaining,
            max: entry.max,
        },
        None => LimitLine::Unknown {
            name: name.to_string(),
        },
    };

    let lines = match selection {
        Selection::All => limits.keys().map(|name| line(name.as_str())).collect(),
        Selection::Named(names) => names.iter().map(|name| line(name.as_str())).collect(),
    };
    LimitsReport { lines }
}

/// Fetch the snapshot and build the report.
pub async fn fetch_report(
    org: &dyn OrgApi,
    selection: &Selection,
) -> Result<LimitsReport, OrgError> {
    let limits = org.limits().await?;
    tracing::debug!(count = limits.len(), "fetched limits");
    Ok(build_report(&limits, selection))
}
