use std::path::PathBuf;

use clap::{ArgAction, Parser};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "pscore",
    about = "Recompute Jira priority scores for a saved filter and write back changes",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "PSCORE_SETTINGS",
        help = "Path to appsettings.json. Defaults to searching upward from the working directory, then from the executable directory"
    )]
    pub settings: Option<PathBuf>,

    #[arg(
        long = "dry-run",
        env = "PSCORE_DRY_RUN",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Log intended writes and comments without changing Jira. Overrides Jira.DryRun"
    )]
    pub dry_run: Option<bool>,

    #[arg(
        long,
        default_value_t = false,
        help = "Write scores and comments to Jira. Takes precedence over --dry-run and PSCORE_DRY_RUN"
    )]
    pub live: bool,

    #[arg(
        long = "filter-id",
        env = "PSCORE_FILTER_ID",
        value_parser = parse_positive_u64,
        help = "Saved filter id to process. Overrides Jira.FilterId"
    )]
    pub filter_id: Option<u64>,

    #[arg(
        long = "no-email",
        default_value_t = false,
        help = "Do not email the run report even when Email.SendReport is enabled"
    )]
    pub no_email: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Do not echo the run log to stdout"
    )]
    pub quiet: bool,
}

impl Cli {
    /// Dry-run override requested on the command line, if any.
    pub fn dry_run_override(&self) -> Option<bool> {
        if self.live {
            Some(false)
        } else {
            self.dry_run
        }
    }
}
