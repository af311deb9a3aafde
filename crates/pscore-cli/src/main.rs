mod bootstrap;
mod cli_args;
mod reconcile_command;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use pscore_runtime::MailOutcome;

use crate::bootstrap::init_tracing;
use crate::cli_args::Cli;
use crate::reconcile_command::{apply_cli_overrides, run_reconciliation, send_run_report};
use crate::settings::{load_settings, resolve_settings_path};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match resolve_settings_path(cli.settings.as_deref())
        .and_then(|path| load_settings(&path))
    {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::FAILURE;
        }
    };
    apply_cli_overrides(&mut settings, &cli);
    if let Err(error) = settings.jira.validate() {
        eprintln!("Error: {error}");
        return ExitCode::FAILURE;
    }
    init_tracing(settings.jira.verbosity().any());

    let outcome = run_reconciliation(&settings.jira, !cli.quiet).await;

    match send_run_report(
        &settings.email,
        settings.jira.request_timeout_ms,
        &outcome.log.render(),
    )
    .await
    {
        Ok(Some(MailOutcome::Sent)) => println!("Report email sent."),
        Ok(Some(MailOutcome::SkippedMissingSettings)) => {
            println!("Email settings are missing. Skipping report email.")
        }
        Ok(None) => {}
        Err(error) => eprintln!("Failed to send report email: {error:#}"),
    }

    if outcome.stats.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
