use std::sync::Once;

use tracing::Level;

/// Install a global fmt subscriber printing events at `level` and above.
///
/// Safe to call from several tests: only the first call installs a
/// subscriber, later calls are ignored.
///
/// Prefer this to a per-test capturing subscriber when the logs only
/// need to be read, not asserted on.
pub fn set_tracing_env_filter(level: Level) {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(level.as_str()))
            .with_test_writer()
            .finish();
        // Another harness may already own the global default.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
