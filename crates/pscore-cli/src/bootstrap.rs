use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` overrides the default level, which is
/// INFO when any Jira verbosity flag is set and WARN otherwise.
pub(crate) fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
