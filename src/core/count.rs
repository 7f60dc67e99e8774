//! core::count
//!
//! Record-count reporter.
//!
//! Objects with active record types are counted per record type with a
//! grouped query; everything else with a plain `count(Id)`. Record type
//! ids that are not active (or null) are reported under [`MASTER_LABEL`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::reference::load_record_types;
use super::selection::Selection;
use crate::org::{query_as, OrgApi, OrgError};

/// Label for rows with no active record type.
pub const MASTER_LABEL: &str = "--MASTER--";

/// Plain count query for `object`.
pub fn count_query(object: &str) -> String {
    format!("select count(Id) record_count from {}", object)
}

/// Count query grouped by record type for `object`.
pub fn grouped_count_query(object: &str) -> String {
    format!(
        "select RecordTypeId, count(Id) record_count from {} group by RecordTypeId",
        object
    )
}

/// Progress line printed once the object set is known.
pub fn checking_line(objects: usize) -> String {
    format!("Checking {} objects...", objects)
}

#[derive(Debug, Deserialize)]
struct CountRow {
    #[serde(rename = "RecordTypeId", default)]
    record_type_id: Option<String>,
    record_count: u64,
}

/// Rows of one record type within an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTypeCount {
    pub name: String,
    pub count: u64,
}

/// Rows of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectCount {
    pub name: String,
    pub total: u64,
    /// Per record type breakdown, empty for objects without record types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub record_types: Vec<RecordTypeCount>,
}

/// Counts for every object with at least one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountReport {
    /// Number of objects queried
    pub checked: usize,
    /// Objects by total descending, then name
    pub objects: Vec<ObjectCount>,
}

impl CountReport {
    /// Render as `Object: total` lines, each followed by its
    /// `Object.RecordType: count` lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for object in &self.objects {
            lines.push(format!("{}: {}", object.name, object.total));
            for rt in &object.record_types {
                lines.push(format!("{}.{}: {}", object.name, rt.name, rt.count));
            }
        }
        lines
    }
}

/// Determine which objects to count, sorted by name.
///
/// `All` uses the global describe, keeping only countable objects not in
/// `exclude`. Named objects are taken as given.
pub async fn resolve_objects(
    org: &dyn OrgApi,
    selection: &Selection,
    exclude: &[String],
) -> Result<Vec<String>, OrgError> {
    let mut objects: Vec<String> = match selection {
        Selection::All => org
            .describe_global()
            .await?
            .into_iter()
            .filter(|s| s.is_countable() && !exclude.contains(&s.name))
            .map(|s| s.name)
            .collect(),
        Selection::Named(names) => names.clone(),
    };
    objects.sort();
    objects.dedup();
    Ok(objects)
}

/// Count rows of each object in `objects`, in order.
///
/// # Errors
///
/// The first failing query aborts the report.
pub async fn count_records(org: &dyn OrgApi, objects: &[String]) -> Result<CountReport, OrgError> {
    let record_types = load_record_types(org).await?;
    let with_record_types: BTreeSet<&str> =
        record_types.iter().map(|rt| rt.sobject_type.as_str()).collect();
    let names_by_id: HashMap<&str, &str> = record_types
        .iter()
        .map(|rt| (rt.id.as_str(), rt.developer_name.as_str()))
        .collect();

    let mut counted = Vec::new();
    for object in objects {
        let count = if with_record_types.contains(object.as_str()) {
            let rows: Vec<CountRow> = query_as(org, &grouped_count_query(object)).await?;
            let mut breakdown: Vec<RecordTypeCount> = Vec::new();
            for row in rows.into_iter().filter(|r| r.record_count > 0) {
                let name = row
                    .record_type_id
                    .as_deref()
                    .and_then(|id| names_by_id.get(id).copied())
                    .unwrap_or(MASTER_LABEL);
                match breakdown.iter_mut().find(|rt| rt.name == name) {
                    Some(existing) => existing.count += row.record_count,
                    None => breakdown.push(RecordTypeCount {
                        name: name.to_string(),
                        count: row.record_count,
                    }),
                }
            }
            ObjectCount {
                name: object.clone(),
                total: breakdown.iter().map(|rt| rt.count).sum(),
                record_types: breakdown,
            }
        } else {
            let rows: Vec<CountRow> = query_as(org, &count_query(object)).await?;
            ObjectCount {
                name: object.clone(),
                total: rows.iter().map(|r| r.record_count).sum(),
                record_types: Vec::new(),
            }
        };
        tracing::debug!(object = %count.name, total = count.total, "counted");
        counted.push(count);
    }

    counted.retain(|c| c.total > 0);
    counted.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    Ok(CountReport {
        checked: objects.len(),
        objects: counted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::RECORD_TYPE_QUERY;
    use crate::org::mock::{FailOn, MockOrg};
    use crate::org::SObjectSummary;
    use serde_json::json;

    fn sobject(name: &str, countable: bool) -> SObjectSummary {
        SObjectSummary {
            name: name.into(),
            queryable: true,
            layoutable: countable,
            retrieveable: true,
            custom: false,
            triggerable: true,
        }
    }

    fn account_org() -> MockOrg {
        MockOrg::new()
            .with_query(
                RECORD_TYPE_QUERY,
                vec![
                    json!({"Id": "012C", "SobjectType": "Account", "DeveloperName": "Customer"}),
                    json!({"Id": "012V", "SobjectType": "Account", "DeveloperName": "Vendor"}),
                ],
            )
            .with_query(
                grouped_count_query("Account"),
                vec![
                    json!({"RecordTypeId": "012V", "record_count": 2}),
                    json!({"RecordTypeId": "012C", "record_count": 12}),
                ],
            )
    }

    #[test]
    fn query_text() {
        assert_eq!(count_query("User"), "select count(Id) record_count from User");
        assert_eq!(
            grouped_count_query("Account"),
            "select RecordTypeId, count(Id) record_count from Account group by RecordTypeId"
        );
        assert_eq!(checking_line(3), "Checking 3 objects...");
    }

    #[tokio::test]
    async fn record_type_breakdown() {
        let org = account_org();

        let report = count_records(&org, &["Account".to_string()]).await.unwrap();

        assert_eq!(
            report.lines(),
            vec!["Account: 14", "Account.Vendor: 2", "Account.Customer: 12"]
        );
    }

    #[tokio::test]
    async fn unknown_and_null_record_types_merge_into_master() {
        let org = account_org().with_query(
            grouped_count_query("Account"),
            vec![
                json!({"RecordTypeId": null, "record_count": 3}),
                json!({"RecordTypeId": "012X", "record_count": 4}),
                json!({"RecordTypeId": "012C", "record_count": 0}),
            ],
        );

        let report = count_records(&org, &["Account".to_string()]).await.unwrap();

        assert_eq!(report.lines(), vec!["Account: 7", "Account.--MASTER--: 7"]);
    }

    #[tokio::test]
    async fn sorted_by_total_then_name_and_zero_omitted() {
        let org = account_org()
            .with_query(count_query("User"), vec![json!({"record_count": 14})])
            .with_query(count_query("Lead"), vec![json!({"record_count": 0})])
            .with_query(count_query("Opportunity"), vec![json!({"record_count": 38})]);
        let objects: Vec<String> = ["Account", "Lead", "Opportunity", "User"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = count_records(&org, &objects).await.unwrap();

        assert_eq!(report.checked, 4);
        let names: Vec<&str> = report.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Opportunity", "Account", "User"]);
    }

    #[tokio::test]
    async fn resolve_all_filters_describe() {
        let org = MockOrg::new().with_sobjects(vec![
            sobject("Contact", true),
            sobject("FeedItem", true),
            sobject("AccountHistory", false),
            sobject("Account", true),
        ]);
        let exclude = vec!["FeedItem".to_string()];

        let objects = resolve_objects(&org, &Selection::All, &exclude).await.unwrap();

        assert_eq!(objects, vec!["Account", "Contact"]);
    }

    #[tokio::test]
    async fn resolve_named_skips_describe() {
        let org = MockOrg::new();
        let selection = Selection::parse(Some("User,Account"));

        let objects = resolve_objects(&org, &selection, &[]).await.unwrap();

        assert_eq!(objects, vec!["Account", "User"]);
        assert!(org.operations().is_empty());
    }

    #[tokio::test]
    async fn query_failure_aborts() {
        let org = account_org().fail_on(FailOn::QueryText(
            grouped_count_query("Account"),
            OrgError::ApiError {
                status: 400,
                message: "INVALID_TYPE: sObject type 'Account' is not supported".into(),
            },
        ));

        let err = count_records(&org, &["Account".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("INVALID_TYPE"));
    }
}
