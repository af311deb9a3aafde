//! Jira REST API client used by the issue processor.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use anyhow::{Context, Result};
use pscore_fields::FieldSet;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::comment_document::render_comment_document;
use crate::jira_api_error::JiraApiError;
use crate::jira_transport_helpers::{render_headers_redacted, truncate_for_error};

/// Field always requested so Jira returns a `fields` object even for sparse issues.
pub const MINIMAL_FIELD_ID: &str = "summary";

const ERROR_BODY_MAX_CHARS: usize = 800;
const MISSING_FIELDS_SNIPPET_MAX_CHARS: usize = 1_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Controls which parts of each exchange are traced.
pub struct JiraLogVerbosity {
    pub log_requests: bool,
    pub log_request_bodies: bool,
    pub log_response_bodies: bool,
    pub log_headers: bool,
}

impl JiraLogVerbosity {
    pub fn any(&self) -> bool {
        self.log_requests || self.log_request_bodies || self.log_response_bodies || self.log_headers
    }
}

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub email: String,
    pub api_token: String,
    pub filter_id: u64,
    pub score_field_id: String,
    pub request_timeout_ms: u64,
    pub request_delay: Duration,
    pub verbosity: JiraLogVerbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLoadStage {
    Filtered,
    Fallback,
}

impl FieldLoadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filtered => "fields-filtered",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLoadFailure {
    pub stage: FieldLoadStage,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of [`JiraApiClient::load_fields`].
///
/// `Unavailable` means neither the filtered nor the fallback fetch produced a
/// `fields` object; it is distinct from a loaded but empty set.
pub enum IssueFields {
    Loaded(FieldSet),
    Unavailable(Vec<FieldLoadFailure>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Issue keys of the configured filter in first-seen order.
pub struct FilterIssueKeys {
    pub keys: Vec<String>,
    /// Keys returned again on a later page (case-insensitive), in encounter order.
    pub repeated_keys: Vec<String>,
    pub pages: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    issues: Vec<SearchIssue>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    is_last: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldNamesPayload {
    #[serde(default)]
    names: BTreeMap<String, Value>,
}

#[derive(Clone)]
pub struct JiraApiClient {
    http: reqwest::Client,
    api_base: String,
    email: String,
    api_token: String,
    filter_id: u64,
    score_field_id: String,
    request_delay: Duration,
    verbosity: JiraLogVerbosity,
}

impl JiraApiClient {
    pub fn new(config: JiraClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("pscore-jira-client"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create jira api client")?;
        Ok(Self {
            http,
            api_base: format!(
                "{}/rest/api/{}",
                config.base_url.trim().trim_end_matches('/'),
                config.api_version.trim()
            ),
            email: config.email.trim().to_string(),
            api_token: config.api_token.trim().to_string(),
            filter_id: config.filter_id,
            score_field_id: config.score_field_id.trim().to_string(),
            request_delay: config.request_delay,
            verbosity: config.verbosity,
        })
    }

    pub fn filter_id(&self) -> u64 {
        self.filter_id
    }

    /// Lists the filter's issue keys using token pagination.
    ///
    /// Paging stops on an empty page, a page without new keys, a missing
    /// continuation token, or `isLast`. A non-success response is an error.
    pub async fn list_issue_keys(&self, page_size: usize) -> Result<FilterIssueKeys, JiraApiError> {
        let url = format!("{}/search/jql", self.api_base);
        let jql = format!("filter={}", self.filter_id);
        let mut listing = FilterIssueKeys::default();
        let mut seen = HashSet::new();
        let mut next_page_token: Option<String> = None;
        loop {
            let mut payload = json!({
                "jql": jql,
                "maxResults": page_size.max(1),
                "fields": [MINIMAL_FIELD_ID],
            });
            if let Some(token) = next_page_token.as_deref() {
                payload["nextPageToken"] = Value::String(token.to_string());
            }
            let page: SearchPage = self
                .request_json(
                    "search filter issues",
                    self.http.request(Method::POST, &url).json(&payload),
                )
                .await?;
            listing.pages = listing.pages.saturating_add(1);
            if page.issues.is_empty() {
                break;
            }

            let mut new_keys = 0_usize;
            for key in page
                .issues
                .into_iter()
                .filter_map(|issue| issue.key)
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
            {
                if seen.insert(key.to_lowercase()) {
                    listing.keys.push(key);
                    new_keys = new_keys.saturating_add(1);
                } else {
                    tracing::debug!(issue_key = key.as_str(), "jira search repeated issue key");
                    listing.repeated_keys.push(key);
                }
            }
            if new_keys == 0 {
                tracing::debug!(
                    page = listing.pages,
                    "jira search page returned no new issue keys; stopping"
                );
                break;
            }
            if page.is_last == Some(true) {
                break;
            }
            match page
                .next_page_token
                .filter(|token| !token.trim().is_empty())
            {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }
        Ok(listing)
    }

    /// Loads the requested fields of an issue, falling back to the full issue.
    pub async fn load_fields(&self, issue_key: &str, field_ids: &[String]) -> IssueFields {
        let url = self.issue_url(issue_key);
        let fields_param = requested_fields_param(field_ids);
        let mut failures = Vec::new();
        for stage in [FieldLoadStage::Filtered, FieldLoadStage::Fallback] {
            let request = match stage {
                FieldLoadStage::Filtered => self
                    .http
                    .get(&url)
                    .query(&[("fields", fields_param.as_str()), ("fieldsByKeys", "true")]),
                FieldLoadStage::Fallback => self.http.get(&url),
            };
            match self.fetch_issue_fields(stage, request).await {
                Ok(fields) => return IssueFields::Loaded(fields),
                Err(detail) => {
                    tracing::warn!(
                        issue_key,
                        stage = stage.as_str(),
                        detail = detail.as_str(),
                        "failed to load jira issue fields"
                    );
                    failures.push(FieldLoadFailure { stage, detail });
                }
            }
        }
        IssueFields::Unavailable(failures)
    }

    /// Maps field ids to display names. Any failure yields an empty map.
    pub async fn load_field_display_names(&self, issue_key: &str) -> BTreeMap<String, String> {
        let request = self
            .http
            .get(self.issue_url(issue_key))
            .query(&[("expand", "names"), ("fields", MINIMAL_FIELD_ID)]);
        match self
            .request_json::<FieldNamesPayload>("load field names", request)
            .await
        {
            Ok(payload) => payload
                .names
                .into_iter()
                .filter_map(|(field_id, name)| {
                    name.as_str().map(|name| (field_id, name.to_string()))
                })
                .collect(),
            Err(error) => {
                tracing::warn!(
                    issue_key,
                    error = %error,
                    "failed to load jira field names"
                );
                BTreeMap::new()
            }
        }
    }

    /// Sets the priority-score field on an issue.
    pub async fn write_score(&self, issue_key: &str, score: f64) -> Result<(), JiraApiError> {
        let mut fields = Map::new();
        fields.insert(self.score_field_id.clone(), score_json_value(score));
        let payload = json!({ "fields": fields });
        self.send(
            "update priority score",
            self.http.put(self.issue_url(issue_key)).json(&payload),
        )
        .await
        .map(|_| ())
    }

    /// Adds an ADF comment, mentioning the assignee in place of `[assignee]`.
    pub async fn add_comment(
        &self,
        issue_key: &str,
        comment_text: &str,
        assignee_account_id: Option<&str>,
    ) -> Result<(), JiraApiError> {
        let payload = json!({
            "body": render_comment_document(comment_text, assignee_account_id)
        });
        self.send(
            "add comment",
            self.http
                .post(format!("{}/comment", self.issue_url(issue_key)))
                .json(&payload),
        )
        .await
        .map(|_| ())
    }

    fn issue_url(&self, issue_key: &str) -> String {
        format!("{}/issue/{}", self.api_base, issue_key.trim())
    }

    async fn fetch_issue_fields(
        &self,
        stage: FieldLoadStage,
        request: reqwest::RequestBuilder,
    ) -> Result<FieldSet, String> {
        let operation = format!("load issue ({})", stage.as_str());
        let body = self
            .send(&operation, request)
            .await
            .map_err(|error| error.to_string())?;
        let payload = serde_json::from_str::<Value>(&body)
            .map_err(|error| format!("failed to decode jira {operation} response: {error}"))?;
        payload
            .get("fields")
            .cloned()
            .and_then(FieldSet::from_json)
            .ok_or_else(|| {
                format!(
                    "response missing fields. Body (truncated): {}",
                    truncate_for_error(&body, MISSING_FIELDS_SNIPPET_MAX_CHARS)
                )
            })
    }

    async fn request_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, JiraApiError>
    where
        T: DeserializeOwned,
    {
        let body = self.send(operation, request).await?;
        serde_json::from_str::<T>(&body).map_err(|source| JiraApiError::Decode {
            operation: operation.to_string(),
            source,
        })
    }

    /// Applies the courtesy delay, sends the request, and returns the body of a
    /// successful response.
    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, JiraApiError> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        let request = request
            .basic_auth(&self.email, Some(&self.api_token))
            .build()
            .map_err(|source| JiraApiError::InvalidRequest {
                operation: operation.to_string(),
                source,
            })?;
        self.trace_request(operation, &request);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| JiraApiError::Transport {
                operation: operation.to_string(),
                source,
            })?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|source| JiraApiError::Transport {
                operation: operation.to_string(),
                source,
            })?;
        self.trace_response(operation, status, &headers, &body);

        if !status.is_success() {
            return Err(JiraApiError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }
        Ok(body)
    }

    fn trace_request(&self, operation: &str, request: &reqwest::Request) {
        if self.verbosity.log_requests {
            tracing::info!(
                operation,
                method = request.method().as_str(),
                url = request.url().as_str(),
                "jira request"
            );
        }
        if self.verbosity.log_headers {
            tracing::info!(
                operation,
                headers = render_headers_redacted(request.headers()).as_str(),
                "jira request headers"
            );
        }
        if self.verbosity.log_request_bodies {
            if let Some(bytes) = request.body().and_then(|body| body.as_bytes()) {
                tracing::info!(
                    operation,
                    body = String::from_utf8_lossy(bytes).as_ref(),
                    "jira request body"
                );
            }
        }
    }

    fn trace_response(&self, operation: &str, status: StatusCode, headers: &HeaderMap, body: &str) {
        if self.verbosity.log_requests {
            tracing::info!(operation, status = status.as_u16(), "jira response");
        }
        if self.verbosity.log_headers {
            tracing::info!(
                operation,
                headers = render_headers_redacted(headers).as_str(),
                "jira response headers"
            );
        }
        if self.verbosity.log_response_bodies {
            tracing::info!(operation, body, "jira response body");
        }
    }
}

/// `summary` followed by the non-blank requested ids, deduplicated case-insensitively.
fn requested_fields_param(field_ids: &[String]) -> String {
    let mut seen = HashSet::new();
    std::iter::once(MINIMAL_FIELD_ID)
        .chain(field_ids.iter().map(|field_id| field_id.trim()))
        .filter(|field_id| !field_id.is_empty())
        .filter(|field_id| seen.insert(field_id.to_lowercase()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Integral scores go out as JSON integers.
fn score_json_value(score: f64) -> Value {
    if score.fract() == 0.0 && score.abs() < i64::MAX as f64 {
        Value::Number(Number::from(score as i64))
    } else {
        Number::from_f64(score)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
