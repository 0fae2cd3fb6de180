//! Helpers shared by the integration tests.

use tracing_subscriber::EnvFilter;

/// Route `tracing` events to the test harness, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
