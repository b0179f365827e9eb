use std::sync::Once;
use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

static TEST_TRACING: Once = Once::new();

/// Installs the global subscriber: `RUST_LOG` filtering with uptime-stamped output.
pub fn setup_timed_tracing() -> Result<(), SetGlobalDefaultError> {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime());
    let sub = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer);
    set_global_default(sub)
}

/// Test variant of [`setup_timed_tracing`]; safe to call from every test.
pub fn setup_test_tracing() {
    TEST_TRACING.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = setup_timed_tracing();
    });
}
