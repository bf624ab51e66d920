//! Logging setup for hosts and demos embedding the bridge.
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once to
//! install a formatting subscriber filtered by the `CANVAS_LOG` environment
//! variable (same syntax as `RUST_LOG`).

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CANVAS_LOG";

const DEFAULT_FILTER: &str = "info";

static LOG_INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops, and an already
/// installed subscriber (e.g. from a host) is left in place.
pub fn init() {
    LOG_INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("subscriber already installed, keeping it");
        }
    });
}
