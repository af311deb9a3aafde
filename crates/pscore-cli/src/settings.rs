//! `appsettings.json` discovery, parsing and validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pscore_jira::{JiraClientConfig, JiraLogVerbosity};
use pscore_runtime::report_mailer::{DEFAULT_MAIL_API_URL, DEFAULT_REPORT_SUBJECT};
use pscore_runtime::{
    EngineeringFieldIds, MailerConfig, ProcessorConfig, ProductFieldIds, RequestTypeValues,
};
use serde::Deserialize;
use thiserror::Error;

pub const SETTINGS_FILE_NAME: &str = "appsettings.json";
const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not find {file_name} in the working directory, the executable directory, or their parents")]
    NotFound { file_name: String },
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Jira BaseUrl, Email, ApiToken, and FilterId are required.")]
    MissingJiraConnection,
    #[error("Jira PriorityScoreFieldId is required.")]
    MissingScoreField,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppSettings {
    pub jira: JiraSettings,
    pub email: EmailSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JiraSettings {
    pub base_url: String,
    pub api_version: String,
    pub email: String,
    pub api_token: String,
    pub filter_id: i64,
    pub page_size: i64,
    pub dry_run: bool,
    pub request_type_field_id: String,
    pub request_type_field_name: String,
    pub priority_score_field_id: String,
    pub reach_field_id: String,
    pub impact_field_id: String,
    pub confidence_field_id: String,
    pub effort_field_id: String,
    pub business_weight_field_id: String,
    pub time_criticality_field_id: String,
    pub risk_reduction_field_id: String,
    pub opportunity_enablement_field_id: String,
    pub request_type_product_value: String,
    pub request_type_engineering_enabler_value: String,
    pub request_type_ktlo_value: String,
    pub request_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub log_requests: bool,
    pub log_request_bodies: bool,
    pub log_response_bodies: bool,
    pub log_headers: bool,
}

impl Default for JiraSettings {
    fn default() -> Self {
        let request_type_values = RequestTypeValues::default();
        Self {
            base_url: String::new(),
            api_version: "3".to_string(),
            email: String::new(),
            api_token: String::new(),
            filter_id: 0,
            page_size: DEFAULT_PAGE_SIZE,
            dry_run: true,
            request_type_field_id: String::new(),
            request_type_field_name: "Request Type".to_string(),
            priority_score_field_id: String::new(),
            reach_field_id: String::new(),
            impact_field_id: String::new(),
            confidence_field_id: String::new(),
            effort_field_id: String::new(),
            business_weight_field_id: String::new(),
            time_criticality_field_id: String::new(),
            risk_reduction_field_id: String::new(),
            opportunity_enablement_field_id: String::new(),
            request_type_product_value: request_type_values.product,
            request_type_engineering_enabler_value: request_type_values.engineering_enabler,
            request_type_ktlo_value: request_type_values.ktlo,
            request_delay_ms: 0,
            request_timeout_ms: 30_000,
            log_requests: false,
            log_request_bodies: false,
            log_response_bodies: false,
            log_headers: false,
        }
    }
}

impl JiraSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let blank = |value: &str| value.trim().is_empty();
        if blank(&self.base_url) || blank(&self.email) || blank(&self.api_token) || self.filter_id <= 0
        {
            return Err(SettingsError::MissingJiraConnection);
        }
        if blank(&self.priority_score_field_id) {
            return Err(SettingsError::MissingScoreField);
        }
        Ok(())
    }

    /// Non-positive page sizes fall back to 50.
    pub fn effective_page_size(&self) -> usize {
        usize::try_from(self.page_size)
            .ok()
            .filter(|page_size| *page_size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE as usize)
    }

    pub fn verbosity(&self) -> JiraLogVerbosity {
        JiraLogVerbosity {
            log_requests: self.log_requests,
            log_request_bodies: self.log_request_bodies,
            log_response_bodies: self.log_response_bodies,
            log_headers: self.log_headers,
        }
    }

    fn validated_filter_id(&self) -> u64 {
        u64::try_from(self.filter_id).unwrap_or_default()
    }

    pub fn client_config(&self) -> JiraClientConfig {
        JiraClientConfig {
            base_url: self.base_url.clone(),
            api_version: self.api_version.clone(),
            email: self.email.clone(),
            api_token: self.api_token.clone(),
            filter_id: self.validated_filter_id(),
            score_field_id: self.priority_score_field_id.clone(),
            request_timeout_ms: self.request_timeout_ms,
            request_delay: Duration::from_millis(self.request_delay_ms),
            verbosity: self.verbosity(),
        }
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            filter_id: self.validated_filter_id(),
            page_size: self.effective_page_size(),
            dry_run: self.dry_run,
            request_type_field_id: self.request_type_field_id.clone(),
            request_type_field_name: self.request_type_field_name.clone(),
            score_field_id: self.priority_score_field_id.clone(),
            product_fields: ProductFieldIds {
                reach: self.reach_field_id.clone(),
                impact: self.impact_field_id.clone(),
                confidence: self.confidence_field_id.clone(),
                effort: self.effort_field_id.clone(),
            },
            engineering_fields: EngineeringFieldIds {
                business_weight: self.business_weight_field_id.clone(),
                time_criticality: self.time_criticality_field_id.clone(),
                risk_reduction: self.risk_reduction_field_id.clone(),
                opportunity_enablement: self.opportunity_enablement_field_id.clone(),
            },
            request_type_values: RequestTypeValues {
                product: self.request_type_product_value.clone(),
                engineering_enabler: self.request_type_engineering_enabler_value.clone(),
                ktlo: self.request_type_ktlo_value.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EmailSettings {
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub send_report: bool,
    pub api_url: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_email: String::new(),
            to_email: String::new(),
            subject: DEFAULT_REPORT_SUBJECT.to_string(),
            send_report: true,
            api_url: DEFAULT_MAIL_API_URL.to_string(),
        }
    }
}

impl EmailSettings {
    pub fn mailer_config(&self, request_timeout_ms: u64) -> MailerConfig {
        MailerConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            from_email: self.from_email.clone(),
            to_email: self.to_email.clone(),
            subject: self.subject.clone(),
            request_timeout_ms,
        }
    }
}

pub fn load_settings(path: &Path) -> Result<AppSettings, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str::<AppSettings>(&raw).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Working directory first, then the executable's directory.
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(current_dir) = std::env::current_dir() {
        roots.push(current_dir);
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }
    roots
}

/// Returns the first `file_name` found walking up from each root in order.
pub fn locate_settings_file(file_name: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    let mut visited_roots = HashSet::new();
    for root in roots {
        if !visited_roots.insert(root.clone()) {
            continue;
        }
        let found = root
            .ancestors()
            .map(|directory| directory.join(file_name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Explicit path when given, otherwise discovery from the default roots.
pub fn resolve_settings_path(explicit: Option<&Path>) -> Result<PathBuf, SettingsError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    locate_settings_file(SETTINGS_FILE_NAME, &default_search_roots()).ok_or_else(|| {
        SettingsError::NotFound {
            file_name: SETTINGS_FILE_NAME.to_string(),
        }
    })
}
