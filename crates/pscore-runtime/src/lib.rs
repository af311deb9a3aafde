//! Priority-score reconciliation runtime.
//!
//! `IssueProcessor` walks a saved Jira filter, scores every matching issue and
//! writes changed scores back. `ReportMailer` ships the finished run log.

pub mod issue_processor;
pub mod report_mailer;
pub mod request_type;
pub mod run_log;
pub mod run_report;
pub mod scoring;
pub mod update_decision;

pub use issue_processor::{IssueProcessor, ProcessorConfig};
pub use report_mailer::{MailOutcome, MailerConfig, MailerError, ReportMailer};
pub use request_type::{RequestTypeClass, RequestTypeValues};
pub use run_log::RunLog;
pub use run_report::RunStats;
pub use scoring::{
    score_engineering, score_product, EngineeringFieldIds, EngineeringInputs, ProductFieldIds,
    ProductInputs, ScoreFormula, ScoreResult,
};
pub use update_decision::{decide_update, UpdateDecision, SCORE_EPSILON};
