//! Reconciliation loop over a saved Jira filter.

use std::collections::HashSet;

use anyhow::{Context, Result};
use pscore_fields::{
    format_number, get_assignee, get_number, get_string, is_match, FieldSet, ASSIGNEE_FIELD_ID,
};
use pscore_jira::{substitute_assignee_placeholder, IssueFields, JiraApiClient};

use crate::request_type::{RequestTypeClass, RequestTypeValues};
use crate::run_log::RunLog;
use crate::run_report::RunStats;
use crate::scoring::{
    score_engineering, score_product, EngineeringFieldIds, ProductFieldIds, ScoreFormula,
    ScoreResult,
};
use crate::update_decision::{decide_update, UpdateDecision};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub filter_id: u64,
    pub page_size: usize,
    pub dry_run: bool,
    pub request_type_field_id: String,
    /// Display name used to discover the request-type field when the id yields nothing.
    pub request_type_field_name: String,
    pub score_field_id: String,
    pub product_fields: ProductFieldIds,
    pub engineering_fields: EngineeringFieldIds,
    pub request_type_values: RequestTypeValues,
}

impl ProcessorConfig {
    /// `assignee` plus every configured non-blank field id, deduplicated
    /// case-insensitively in declaration order.
    pub fn requested_field_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        [
            ASSIGNEE_FIELD_ID,
            self.request_type_field_id.as_str(),
            self.score_field_id.as_str(),
        ]
        .into_iter()
        .chain(self.product_fields.ids())
        .chain(self.engineering_fields.ids())
        .map(str::trim)
        .filter(|field_id| !field_id.is_empty())
        .filter(|field_id| seen.insert(field_id.to_lowercase()))
        .map(str::to_string)
        .collect()
    }

    fn effective_page_size(&self) -> usize {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }
}

pub struct IssueProcessor {
    client: JiraApiClient,
    config: ProcessorConfig,
    log: RunLog,
    stats: RunStats,
}

impl IssueProcessor {
    pub fn new(client: JiraApiClient, config: ProcessorConfig, log: RunLog) -> Self {
        Self {
            client,
            config,
            log,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn into_log(self) -> RunLog {
        self.log
    }

    /// Processes every issue of the configured filter, one at a time.
    ///
    /// Only a listing failure aborts the run; per-issue failures are logged
    /// and the loop moves on.
    pub async fn process_filter(&mut self) -> Result<RunStats> {
        self.stats = RunStats::default();
        let filter_id = self.config.filter_id;
        self.log.record(format!("Using FilterId: {filter_id}"));
        if self.config.dry_run {
            self.log
                .record("DryRun enabled: no changes will be written to Jira.");
        }

        let listing = self
            .client
            .list_issue_keys(self.config.effective_page_size())
            .await
            .with_context(|| format!("failed to list issues for filter {filter_id}"))?;
        self.log.record(format!(
            "Filter {filter_id} returned {} issues across {} page(s).",
            listing.keys.len(),
            listing.pages
        ));
        for repeated_key in &listing.repeated_keys {
            self.log
                .issue(repeated_key, "Skipped: repeated key returned by pagination.");
        }

        let requested_field_ids = self.config.requested_field_ids();
        let mut seen = HashSet::new();
        for issue_key in listing.keys {
            if !seen.insert(issue_key.to_lowercase()) {
                self.log
                    .issue(&issue_key, "Skipped: issue already processed in this run.");
                continue;
            }
            self.stats.record_processed();
            self.process_issue(&issue_key, &requested_field_ids).await;
        }

        let stats = self.stats;
        self.log.record(format!("Run complete: {stats}"));
        Ok(stats)
    }

    async fn process_issue(&mut self, issue_key: &str, requested_field_ids: &[String]) {
        self.log.record(format!("Processing issue {issue_key}..."));
        let fields = match self.client.load_fields(issue_key, requested_field_ids).await {
            IssueFields::Loaded(fields) => fields,
            IssueFields::Unavailable(failures) => {
                for failure in failures {
                    self.log.issue(
                        issue_key,
                        format!(
                            "Field load ({}) failed: {}",
                            failure.stage.as_str(),
                            failure.detail
                        ),
                    );
                }
                self.log.issue(issue_key, "Skipped: could not load fields.");
                return;
            }
        };

        let request_type = self.resolve_request_type(issue_key, &fields).await;
        let class =
            RequestTypeClass::classify(request_type.as_deref(), &self.config.request_type_values);
        let result = match class.formula() {
            Some(ScoreFormula::Product) => score_product(
                get_number(&fields, &self.config.score_field_id),
                self.config.product_fields.read(&fields),
            ),
            Some(ScoreFormula::EngineeringOrKtlo) => score_engineering(
                get_number(&fields, &self.config.score_field_id),
                self.config.engineering_fields.read(&fields),
            ),
            None => {
                self.log.issue(
                    issue_key,
                    format!(
                        "Skipped: Request Type '{}' not matched.",
                        class.display_value()
                    ),
                );
                return;
            }
        };

        self.log.issue(issue_key, result.inputs_summary());
        self.log.issue(
            issue_key,
            format!(
                "{} TempPriorityScore={}",
                result.formula.label(),
                format_number(Some(result.computed_score))
            ),
        );
        self.apply_update(issue_key, &fields, &result).await;
    }

    /// Reads the request type, discovering the field id by display name when the
    /// configured id yields nothing.
    async fn resolve_request_type(&mut self, issue_key: &str, fields: &FieldSet) -> Option<String> {
        let configured_id = self.config.request_type_field_id.trim().to_string();
        if let Some(request_type) = get_string(fields, &configured_id)
            .filter(|request_type| !request_type.trim().is_empty())
        {
            return Some(request_type);
        }

        let field_name = self.config.request_type_field_name.trim().to_string();
        if field_name.is_empty() {
            self.log.issue(
                issue_key,
                "Request Type field not found. Check RequestTypeFieldId.",
            );
            return None;
        }

        let names = self.client.load_field_display_names(issue_key).await;
        let resolved_id = names
            .iter()
            .find(|(_, display_name)| {
                is_match(Some(display_name.as_str()), Some(field_name.as_str()))
            })
            .map(|(field_id, _)| field_id.clone());
        let Some(resolved_id) = resolved_id else {
            let candidates = names
                .iter()
                .filter(|(_, display_name)| display_name.to_lowercase().contains("request"))
                .map(|(field_id, display_name)| format!("{field_id}='{display_name}'"))
                .collect::<Vec<_>>();
            if candidates.is_empty() {
                self.log.issue(
                    issue_key,
                    format!(
                        "Request Type field name '{field_name}' not found. No 'request' fields in names map."
                    ),
                );
            } else {
                self.log.issue(
                    issue_key,
                    format!(
                        "Request Type field name '{field_name}' not found. Candidates: {}",
                        candidates.join(", ")
                    ),
                );
            }
            let present = fields.field_ids();
            if !present.is_empty() {
                self.log.issue(
                    issue_key,
                    format!("Fields present in issue: {}", present.join(", ")),
                );
            }
            return None;
        };

        if !resolved_id.eq_ignore_ascii_case(&configured_id) {
            self.log.issue(
                issue_key,
                format!("Resolved Request Type field id: {resolved_id}"),
            );
        }

        match self
            .client
            .load_fields(issue_key, std::slice::from_ref(&resolved_id))
            .await
        {
            IssueFields::Loaded(refreshed) => get_string(&refreshed, &resolved_id),
            IssueFields::Unavailable(_) => {
                self.log.issue(
                    issue_key,
                    format!("Could not reload field {resolved_id} for Request Type."),
                );
                None
            }
        }
    }

    async fn apply_update(&mut self, issue_key: &str, fields: &FieldSet, result: &ScoreResult) {
        let (new_score, comment_text, suppress_comment) = match decide_update(result) {
            UpdateDecision::Unchanged => {
                self.log.issue(issue_key, "PriorityScore unchanged.");
                return;
            }
            UpdateDecision::Update {
                new_score,
                comment_text,
                suppress_comment,
            } => (new_score, comment_text, suppress_comment),
        };
        let assignee = get_assignee(fields);
        let logged_comment =
            substitute_assignee_placeholder(&comment_text, assignee.display_name.as_deref());
        let rendered_score = format_number(Some(new_score));

        if self.config.dry_run {
            self.log.issue(
                issue_key,
                format!("DryRun - would update PriorityScore to {rendered_score}."),
            );
            if suppress_comment {
                self.log.issue(
                    issue_key,
                    "DryRun - skipping comment because PriorityScore is null and new value is 0.",
                );
            } else {
                self.log.issue(
                    issue_key,
                    format!("DryRun - would add comment:\n{logged_comment}"),
                );
            }
            return;
        }

        if let Err(error) = self.client.write_score(issue_key, new_score).await {
            tracing::warn!(issue_key, kind = error.kind(), "priority score write failed");
            self.log.issue(
                issue_key,
                format!("Failed to update PriorityScore: {error}"),
            );
            return;
        }
        self.stats.record_updated();
        self.log.issue(
            issue_key,
            format!("PriorityScore updated to {rendered_score}."),
        );

        if suppress_comment {
            self.log.issue(
                issue_key,
                "Skipped Jira comment because PriorityScore is null and new value is 0.",
            );
            return;
        }
        match self
            .client
            .add_comment(issue_key, &comment_text, assignee.account_id.as_deref())
            .await
        {
            Ok(()) => {
                self.stats.record_commented();
                self.log
                    .issue(issue_key, format!("Comment added:\n{logged_comment}"));
            }
            Err(error) => {
                tracing::warn!(issue_key, kind = error.kind(), "comment post failed");
                self.log
                    .issue(issue_key, format!("Failed to add comment: {error}"));
            }
        }
    }
}
