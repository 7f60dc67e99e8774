//! Integration tests for the count and limits reporters.
//!
//! These drive the reporters through `MockOrg` and snapshot the rendered
//! lines the commands print.

use serde_json::json;

use sfwry::core::count::{count_query, count_records, grouped_count_query, resolve_objects};
use sfwry::core::limits::{build_report, fetch_report, HEADER};
use sfwry::core::reference::RECORD_TYPE_QUERY;
use sfwry::core::selection::Selection;
use sfwry::org::mock::{FailOn, MockOperation, MockOrg};
use sfwry::org::{OrgError, SObjectSummary};

fn countable(name: &str) -> SObjectSummary {
    SObjectSummary {
        name: name.into(),
        queryable: true,
        layoutable: true,
        retrieveable: true,
        custom: name.ends_with("__c"),
        triggerable: true,
    }
}

/// An org with Account record types and a handful of objects.
fn sample_org() -> MockOrg {
    MockOrg::new()
        .with_sobjects(vec![
            countable("User"),
            countable("Opportunity"),
            countable("FeedItem"),
            countable("CollaborationGroupRecord"),
            countable("Account"),
            countable("Invoice__c"),
            SObjectSummary {
                name: "AccountHistory".into(),
                queryable: true,
                ..Default::default()
            },
        ])
        .with_query(
            RECORD_TYPE_QUERY,
            vec![
                json!({"Id": "0125C000000IGVSQA4", "SobjectType": "Account", "DeveloperName": "Customer"}),
                json!({"Id": "0125C000000IGVIQA4", "SobjectType": "Account", "DeveloperName": "Vendor"}),
            ],
        )
        .with_query(
            grouped_count_query("Account"),
            vec![
                json!({"attributes": {"type": "AggregateResult"}, "RecordTypeId": "0125C000000IGVIQA4", "record_count": 2}),
                json!({"attributes": {"type": "AggregateResult"}, "RecordTypeId": "0125C000000IGVSQA4", "record_count": 12}),
            ],
        )
        .with_query(count_query("Opportunity"), vec![json!({"record_count": 38})])
        .with_query(count_query("User"), vec![json!({"record_count": 5})])
        .with_query(count_query("Invoice__c"), vec![json!({"record_count": 0})])
}

fn default_excludes() -> Vec<String> {
    vec!["CollaborationGroupRecord".into(), "FeedItem".into()]
}

// =============================================================================
// Count
// =============================================================================

mod count_tests {
    use super::*;

    #[tokio::test]
    async fn all_objects_report() {
        let org = sample_org();

        let objects = resolve_objects(&org, &Selection::All, &default_excludes())
            .await
            .unwrap();
        let report = count_records(&org, &objects).await.unwrap();

        assert_eq!(report.checked, 4);
        insta::assert_snapshot!(report.lines().join("\n"), @r"
        Opportunity: 38
        Account: 14
        Account.Vendor: 2
        Account.Customer: 12
        User: 5
        ");
    }

    #[tokio::test]
    async fn explicit_list_queries_only_named_objects() {
        let org = sample_org();
        let selection = Selection::parse(Some(" User ,Account,User"));

        let objects = resolve_objects(&org, &selection, &default_excludes())
            .await
            .unwrap();
        count_records(&org, &objects).await.unwrap();

        assert!(!org.operations().contains(&MockOperation::DescribeGlobal));
        assert_eq!(
            org.queries(),
            vec![
                RECORD_TYPE_QUERY.to_string(),
                grouped_count_query("Account"),
                count_query("User"),
            ]
        );
    }

    #[tokio::test]
    async fn json_report_shape() {
        let org = sample_org();

        let report = count_records(&org, &["User".to_string(), "Account".to_string()])
            .await
            .unwrap();

        insta::assert_snapshot!(serde_json::to_string_pretty(&report).unwrap(), @r#"
        {
          "checked": 2,
          "objects": [
            {
              "name": "Account",
              "total": 14,
              "record_types": [
                {
                  "name": "Vendor",
                  "count": 2
                },
                {
                  "name": "Customer",
                  "count": 12
                }
              ]
            },
            {
              "name": "User",
              "total": 5
            }
          ]
        }
        "#);
    }

    #[tokio::test]
    async fn describe_failure_is_fatal() {
        let org = sample_org().fail_on(FailOn::DescribeGlobal(OrgError::AuthFailed(
            "Session expired or invalid".into(),
        )));

        let err = resolve_objects(&org, &Selection::All, &default_excludes())
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::AuthFailed(_)));
    }
}

// =============================================================================
// Limits
// =============================================================================

mod limits_tests {
    use super::*;

    fn limits_org() -> MockOrg {
        MockOrg::new()
            .with_limit("DailyApiRequests", 15000, 14419)
            .with_limit("DataStorageMB", 5, 4)
            .with_limit("SingleEmail", 15, 15)
    }

    fn render(header: &str, lines: &[String]) -> String {
        std::iter::once(header.to_string())
            .chain(lines.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn requested_and_unknown_limits() {
        let org = limits_org();

        let report = fetch_report(&org, &Selection::parse(Some("DailyApiRequests,Foo")))
            .await
            .unwrap();
        let lines: Vec<String> = report.lines.iter().map(|l| l.to_string()).collect();

        insta::assert_snapshot!(render(HEADER, &lines), @r"
        Limit: REMAINING of MAXIMUM
        DailyApiRequests: 14419 of 15000
        Error: unknown limit: Foo
        ");
    }

    #[tokio::test]
    async fn all_limits_in_name_order() {
        let org = limits_org();

        let report = fetch_report(&org, &Selection::parse(Some("ALL"))).await.unwrap();
        let lines: Vec<String> = report.lines.iter().map(|l| l.to_string()).collect();

        insta::assert_snapshot!(render(HEADER, &lines), @r"
        Limit: REMAINING of MAXIMUM
        DailyApiRequests: 14419 of 15000
        DataStorageMB: 4 of 5
        SingleEmail: 15 of 15
        ");
        assert_eq!(org.operations(), vec![MockOperation::Limits]);
    }

    #[test]
    fn empty_snapshot_reports_every_request_unknown() {
        let report = build_report(&Default::default(), &Selection::parse(Some("A,B")));
        assert!(report.has_unknown());
        assert_eq!(report.lines.len(), 2);
    }
}
