use anyhow::Result;
use pscore_jira::JiraApiClient;
use pscore_runtime::{IssueProcessor, MailOutcome, ReportMailer, RunLog, RunStats};

use crate::cli_args::Cli;
use crate::settings::{AppSettings, EmailSettings, JiraSettings};

pub(crate) struct ReconcileOutcome {
    /// `None` when the run ended with a top-level error.
    pub stats: Option<RunStats>,
    pub log: RunLog,
}

pub(crate) fn apply_cli_overrides(settings: &mut AppSettings, cli: &Cli) {
    if let Some(dry_run) = cli.dry_run_override() {
        settings.jira.dry_run = dry_run;
    }
    if let Some(filter_id) = cli.filter_id {
        settings.jira.filter_id = i64::try_from(filter_id).unwrap_or(i64::MAX);
    }
    if cli.no_email {
        settings.email.send_report = false;
    }
}

/// Runs one reconciliation pass. A top-level failure is recorded once as an
/// `Error: ...` line so it reaches the emailed report.
pub(crate) async fn run_reconciliation(jira: &JiraSettings, echo: bool) -> ReconcileOutcome {
    let mut log = RunLog::new(echo);
    let result: Result<RunStats> = match JiraApiClient::new(jira.client_config()) {
        Ok(client) => {
            let mut processor = IssueProcessor::new(client, jira.processor_config(), log);
            let result = processor.process_filter().await;
            log = processor.into_log();
            result
        }
        Err(error) => Err(error),
    };
    match result {
        Ok(stats) => ReconcileOutcome {
            stats: Some(stats),
            log,
        },
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "reconciliation run failed");
            log.record(format!("Error: {error:#}"));
            ReconcileOutcome { stats: None, log }
        }
    }
}

/// Emails the rendered run log when reporting is enabled.
pub(crate) async fn send_run_report(
    email: &EmailSettings,
    request_timeout_ms: u64,
    report: &str,
) -> Result<Option<MailOutcome>> {
    if !email.send_report {
        return Ok(None);
    }
    let mailer = ReportMailer::new(email.mailer_config(request_timeout_ms))?;
    let outcome = mailer.send_report(None, report).await?;
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use httpmock::prelude::*;
    use serde_json::json;

    fn jira_settings(server: &MockServer, dry_run: bool) -> JiraSettings {
        JiraSettings {
            base_url: server.base_url(),
            email: "bot@example.com".to_string(),
            api_token: "token-123".to_string(),
            filter_id: 10_100,
            dry_run,
            request_type_field_id: "customfield_10".to_string(),
            priority_score_field_id: "customfield_500".to_string(),
            reach_field_id: "customfield_1".to_string(),
            impact_field_id: "customfield_2".to_string(),
            confidence_field_id: "customfield_3".to_string(),
            effort_field_id: "customfield_4".to_string(),
            request_timeout_ms: 2_000,
            ..JiraSettings::default()
        }
    }

    #[test]
    fn unit_apply_cli_overrides_updates_mode_filter_and_email() {
        let _env_lock = crate::cli_args::tests::lock_cli_env();
        let mut settings = AppSettings::default();
        let cli = Cli::try_parse_from(["pscore", "--live", "--filter-id", "42", "--no-email"])
            .expect("parse");
        apply_cli_overrides(&mut settings, &cli);
        assert!(!settings.jira.dry_run);
        assert_eq!(settings.jira.filter_id, 42);
        assert!(!settings.email.send_report);

        let mut untouched = AppSettings::default();
        apply_cli_overrides(&mut untouched, &Cli::try_parse_from(["pscore"]).expect("parse"));
        assert!(untouched.jira.dry_run);
        assert!(untouched.email.send_report);
    }

    #[tokio::test]
    async fn integration_live_run_report_is_emailed() {
        let jira = MockServer::start();
        jira.mock(|when, then| {
            when.method(POST).path("/rest/api/3/search/jql");
            then.status(200)
                .json_body(json!({ "issues": [{ "key": "PS-1" }], "isLast": true }));
        });
        jira.mock(|when, then| {
            when.method(GET).path("/rest/api/3/issue/PS-1");
            then.status(200).json_body(json!({
                "fields": {
                    "customfield_10": "Product PR",
                    "customfield_1": 8,
                    "customfield_2": 2,
                    "customfield_3": 0.8,
                    "customfield_4": 4
                }
            }));
        });
        let write = jira.mock(|when, then| {
            when.method(PUT).path("/rest/api/3/issue/PS-1");
            then.status(204);
        });
        jira.mock(|when, then| {
            when.method(POST).path("/rest/api/3/issue/PS-1/comment");
            then.status(201);
        });

        let outcome = run_reconciliation(&jira_settings(&jira, false), false).await;
        assert_eq!(
            outcome.stats,
            Some(RunStats {
                processed: 1,
                updated: 1,
                commented: 1
            })
        );
        write.assert_calls(1);

        let mail = MockServer::start();
        let send = mail.mock(|when, then| {
            when.method(POST)
                .path("/v3/mail/send")
                .header("authorization", "Bearer SG.key")
                .body_includes("[PS-1] PriorityScore updated to 3.")
                .body_includes("\"subject\":\"JiraPriorityScore report\"");
            then.status(202);
        });
        let email = EmailSettings {
            api_key: "SG.key".to_string(),
            from_email: "bot@example.com".to_string(),
            to_email: "team@example.com".to_string(),
            api_url: mail.url("/v3/mail/send"),
            ..EmailSettings::default()
        };
        let delivered = send_run_report(&email, 2_000, &outcome.log.render())
            .await
            .expect("send");
        assert_eq!(delivered, Some(MailOutcome::Sent));
        send.assert_calls(1);
    }

    #[tokio::test]
    async fn regression_listing_failure_is_recorded_as_single_error_line() {
        let jira = MockServer::start();
        jira.mock(|when, then| {
            when.method(POST).path("/rest/api/3/search/jql");
            then.status(500).body("search unavailable");
        });

        let outcome = run_reconciliation(&jira_settings(&jira, true), false).await;
        assert_eq!(outcome.stats, None);
        let error_lines = outcome
            .log
            .lines()
            .iter()
            .filter(|line| line.starts_with("Error: "))
            .collect::<Vec<_>>();
        assert_eq!(error_lines.len(), 1);
        assert!(error_lines[0].contains("failed to list issues for filter 10100"));
        assert!(error_lines[0].contains("search unavailable"));
    }

    #[tokio::test]
    async fn functional_send_run_report_honours_disabled_and_incomplete_settings() {
        let disabled = EmailSettings {
            send_report: false,
            ..EmailSettings::default()
        };
        assert_eq!(
            send_run_report(&disabled, 2_000, "report").await.expect("disabled"),
            None
        );

        let incomplete = EmailSettings::default();
        assert_eq!(
            send_run_report(&incomplete, 2_000, "report")
                .await
                .expect("incomplete"),
            Some(MailOutcome::SkippedMissingSettings)
        );
    }
}
