//! Logging setup
//!
//! `RUST_LOG` takes precedence when set, e.g. `RUST_LOG=mortarlab=trace`.
//! Otherwise only warnings are shown, or debug output for this crate with
//! `--verbose`. Everything goes to stderr so stdout stays pipeable.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber for the binary
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,mortarlab=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .try_init();
}

/// Initialise logging for tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
