//! Jira Cloud REST client for the priority-score reconciler.
//!
//! Only the endpoints the reconciler needs are covered: filter search, issue field
//! fetches, field display names, a single numeric field update, and ADF comments.

pub mod comment_document;
pub mod jira_api_client;
pub mod jira_api_error;
pub mod jira_transport_helpers;

pub use comment_document::{
    render_comment_document, strip_assignee_placeholder, substitute_assignee_placeholder,
    ASSIGNEE_PLACEHOLDER,
};
pub use jira_api_client::{
    FieldLoadFailure, FieldLoadStage, FilterIssueKeys, IssueFields, JiraApiClient,
    JiraClientConfig, JiraLogVerbosity, MINIMAL_FIELD_ID,
};
pub use jira_api_error::JiraApiError;
