//! Diagnostic logging to stderr.

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter directives.
pub const LOG_ENV: &str = "WHENCE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Filter directives come from `WHENCE_LOG`,
/// falling back to warnings only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
