//! Tracing setup for binaries and examples.

use tracing_subscriber::EnvFilter;

/// Initialize a stderr subscriber, honoring `RUST_LOG` when set.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
