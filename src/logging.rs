//! Logging configuration for sqlgauge.
//!
//! Evaluation runs are batch jobs, so logs go to stderr where they can be
//! captured alongside test output or redirected by the caller.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging.
///
/// The filter honors `RUST_LOG` and defaults to `info`. Per-query timing is
/// logged at info; schema dumps at debug.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
