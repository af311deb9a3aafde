use std::time::Duration;

use httpmock::prelude::*;
use pscore_jira::{JiraApiClient, JiraClientConfig, JiraLogVerbosity};
use pscore_runtime::{
    EngineeringFieldIds, IssueProcessor, ProcessorConfig, ProductFieldIds, RequestTypeValues,
    RunLog, RunStats,
};
use serde_json::json;

fn processor_for(server: &MockServer, dry_run: bool) -> IssueProcessor {
    let client = JiraApiClient::new(JiraClientConfig {
        base_url: server.base_url(),
        api_version: "3".to_string(),
        email: "bot@example.com".to_string(),
        api_token: "token-123".to_string(),
        filter_id: 777,
        score_field_id: "customfield_500".to_string(),
        request_timeout_ms: 2_000,
        request_delay: Duration::from_millis(1),
        verbosity: JiraLogVerbosity::default(),
    })
    .expect("client");
    let config = ProcessorConfig {
        filter_id: 777,
        page_size: 2,
        dry_run,
        request_type_field_id: "customfield_10".to_string(),
        request_type_field_name: "Request Type".to_string(),
        score_field_id: "customfield_500".to_string(),
        product_fields: ProductFieldIds {
            reach: "customfield_1".to_string(),
            impact: "customfield_2".to_string(),
            confidence: "customfield_3".to_string(),
            effort: "customfield_4".to_string(),
        },
        engineering_fields: EngineeringFieldIds {
            business_weight: "customfield_5".to_string(),
            time_criticality: "customfield_6".to_string(),
            risk_reduction: "customfield_7".to_string(),
            opportunity_enablement: "customfield_8".to_string(),
        },
        request_type_values: RequestTypeValues::default(),
    };
    IssueProcessor::new(client, config, RunLog::new(false))
}

fn mock_filter_pages(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/search/jql")
            .body_includes("\"jql\":\"filter=777\"")
            .body_includes("\"maxResults\":2")
            .body_excludes("nextPageToken");
        then.status(200).json_body(json!({
            "issues": [{ "key": "OPS-1" }, { "key": "OPS-2" }],
            "nextPageToken": "t2"
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/search/jql")
            .body_includes("\"nextPageToken\":\"t2\"");
        then.status(200).json_body(json!({
            "issues": [{ "key": "OPS-3" }, { "key": "OPS-4" }, { "key": "ops-1" }]
        }));
    });
}

fn mock_issue(server: &MockServer, key: &str, fields: serde_json::Value) {
    let path = format!("/rest/api/3/issue/{key}");
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200)
            .json_body(json!({ "key": key, "fields": fields }));
    });
}

fn mock_mixed_filter(server: &MockServer) {
    mock_filter_pages(server);
    mock_issue(
        server,
        "OPS-1",
        json!({
            "assignee": { "accountId": "acct-1", "displayName": "Grace Hopper" },
            "customfield_10": { "value": "Product PR" },
            "customfield_500": 1,
            "customfield_1": 8,
            "customfield_2": 2,
            "customfield_3": 0.8,
            "customfield_4": 4
        }),
    );
    mock_issue(
        server,
        "OPS-2",
        json!({
            "customfield_10": { "value": "Engineering Enabler" },
            "customfield_500": 667,
            "customfield_5": 4,
            "customfield_6": 3,
            "customfield_7": 3,
            "customfield_8": 2
        }),
    );
    mock_issue(
        server,
        "OPS-3",
        json!({ "customfield_10": { "value": "Incident" } }),
    );
    mock_issue(
        server,
        "OPS-4",
        json!({
            "customfield_10": "Keep the Lights on (KTLO)",
            "customfield_500": "12",
            "customfield_5": [1],
            "customfield_6": "1",
            "customfield_7": { "value": "1" },
            "customfield_8": 1
        }),
    );
}

#[tokio::test]
async fn integration_mixed_filter_live_run_updates_only_changed_issues() {
    let server = MockServer::start();
    mock_mixed_filter(&server);
    let ops1_write = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/api/3/issue/OPS-1")
            .body_includes("\"customfield_500\":3");
        then.status(204);
    });
    let ops1_comment = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-1/comment")
            .body_includes("\"id\":\"acct-1\"");
        then.status(201);
    });
    let ops2_write = server.mock(|when, then| {
        when.method(PUT).path("/rest/api/3/issue/OPS-2");
        then.status(204);
    });
    let ops3_write = server.mock(|when, then| {
        when.method(PUT).path("/rest/api/3/issue/OPS-3");
        then.status(204);
    });
    let ops4_write = server.mock(|when, then| {
        when.method(PUT)
            .path("/rest/api/3/issue/OPS-4")
            .body_includes("\"customfield_500\":0");
        then.status(204);
    });
    let ops4_comment = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-4/comment")
            .body_includes("updated priority from 12 to 0");
        then.status(201);
    });

    let mut processor = processor_for(&server, false);
    let stats = processor.process_filter().await.expect("run");
    assert_eq!(
        stats,
        RunStats {
            processed: 4,
            updated: 2,
            commented: 2
        }
    );

    let report = processor.into_log().render();
    assert!(report.contains("Using FilterId: 777"));
    assert!(report.contains("Filter 777 returned 4 issues across 2 page(s)."));
    assert!(report.contains("[ops-1] Skipped: repeated key returned by pagination."));
    assert!(report.contains(
        "[OPS-1] Comment added:\nGrace Hopper updated priority from 1 to 3 (Reach=8, Impact=2, Confidence=0.8, Effort=4)"
    ));
    assert!(report.contains("[OPS-2] PriorityScore unchanged."));
    assert!(report.contains("[OPS-3] Skipped: Request Type 'Incident' not matched."));
    assert!(report.contains("[OPS-4] Engineering Enabler/KTLO TempPriorityScore=0"));
    assert!(report.ends_with("Run complete: processed=4 updated=2 commented=2"));

    ops1_write.assert_calls(1);
    ops1_comment.assert_calls(1);
    ops2_write.assert_calls(0);
    ops3_write.assert_calls(0);
    ops4_write.assert_calls(1);
    ops4_comment.assert_calls(1);
}

#[tokio::test]
async fn integration_mixed_filter_dry_run_touches_nothing() {
    let server = MockServer::start();
    mock_mixed_filter(&server);
    let writes = server.mock(|when, then| {
        when.method(PUT);
        then.status(204);
    });

    let mut processor = processor_for(&server, true);
    let stats = processor.process_filter().await.expect("run");
    assert_eq!(
        stats,
        RunStats {
            processed: 4,
            updated: 0,
            commented: 0
        }
    );
    let report = processor.log().render();
    assert!(report.contains("[OPS-1] DryRun - would update PriorityScore to 3."));
    assert!(report.contains("[OPS-4] DryRun - would add comment:\nupdated priority from 12 to 0"));
    writes.assert_calls(0);
}
