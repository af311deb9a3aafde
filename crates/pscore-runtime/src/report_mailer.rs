//! Plain-text report email over a SendGrid v3 style `mail/send` endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use pscore_jira::jira_transport_helpers::truncate_for_error;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::json;
use thiserror::Error;

pub const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";
pub const DEFAULT_REPORT_SUBJECT: &str = "JiraPriorityScore report";

const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub request_timeout_ms: u64,
}

impl MailerConfig {
    /// True when the key and both addresses are present.
    pub fn is_complete(&self) -> bool {
        [&self.api_key, &self.from_email, &self.to_email]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailOutcome {
    Sent,
    SkippedMissingSettings,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("report email request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("report email rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct ReportMailer {
    http: reqwest::Client,
    config: MailerConfig,
}

impl ReportMailer {
    pub fn new(config: MailerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("pscore-report-mailer"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create report mail client")?;
        Ok(Self { http, config })
    }

    /// Sends `body` as the report. A blank `subject` falls back to the configured one.
    pub async fn send_report(
        &self,
        subject: Option<&str>,
        body: &str,
    ) -> Result<MailOutcome, MailerError> {
        if !self.config.is_complete() {
            tracing::warn!("report email settings incomplete; skipping send");
            return Ok(MailOutcome::SkippedMissingSettings);
        }
        let subject = subject
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .unwrap_or(self.config.subject.as_str());
        let payload = json!({
            "personalizations": [{
                "to": [{ "email": self.config.to_email.trim() }]
            }],
            "from": { "email": self.config.from_email.trim() },
            "subject": subject,
            "content": [{
                "type": "text/plain",
                "value": body
            }]
        });

        let response = self
            .http
            .post(self.config.api_url.trim())
            .bearer_auth(self.config.api_key.trim())
            .json(&payload)
            .send()
            .await
            .map_err(MailerError::Transport)?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "report email accepted");
            return Ok(MailOutcome::Sent);
        }
        let body = response.text().await.map_err(MailerError::Transport)?;
        Err(MailerError::Status {
            status: status.as_u16(),
            body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
        })
    }
}
