//! Verbose diagnostics for `MISTAKE_DEBUG=1`

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const VERBOSE_FILTER: &str = "mistake=debug,mistake_core=debug";

/// Send debug-level mistake events to stderr.
///
/// Does nothing if the host already installed a global subscriber.
pub fn init_verbose_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(VERBOSE_FILTER));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    if result.is_err() {
        tracing::debug!("a tracing subscriber is already installed");
    }
}
