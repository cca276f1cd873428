//! Shared test setup: one tracing subscriber for every test in the binary

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// Targets kept out of test output, matched by prefix.
const NOISY_TARGETS: [&str; 2] = ["tokio", "runtime"];

static TEST_SETUP: Once = Once::new();

/// Install the test subscriber; later calls are no-ops.
///
/// `RUST_LOG` selects what is shown, defaulting to `treeviz=trace`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            debug!("tracing subscriber already set");
            return;
        }
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("treeviz=trace"));
        let quiet = filter_fn(|metadata| {
            !NOISY_TARGETS
                .iter()
                .any(|name| metadata.target().starts_with(name))
        });

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(quiet)
            .with_filter(env_filter);
        if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
            eprintln!("Error: Failed to set up logging: {e}");
        }
        debug!("test setup complete");
    });
}
