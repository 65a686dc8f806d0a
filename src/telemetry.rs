//! Structured logging setup.
//!
//! The crate emits `tracing` events and spans; installing a subscriber is
//! left to the embedding binary or test harness through [`init_tracing`].

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs a global `fmt` subscriber filtered by `filter`.
///
/// Only the first call in a process attempts installation. Returns `true`
/// when this call installed the subscriber, and `false` when an earlier call
/// already ran or another subscriber was installed elsewhere.
///
/// An unparsable `filter` falls back to `info`.
#[must_use]
pub fn init_tracing(filter: &str) -> bool {
    let mut installed = false;
    TRACING_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
        installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init()
            .is_ok();
    });
    if installed {
        tracing::debug!(filter, "tracing subscriber installed");
    }
    installed
}
