//! Tracing setup: subscriber initialization, stage spans, and structured events.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Initialize the fops tracing/logging system.
///
/// Reads the `FOPS_LOG` environment variable for per-target log levels,
/// e.g. `FOPS_LOG=fops_validation=debug,fops_audit=warn`. Falls back to
/// `config.log_level` if `FOPS_LOG` is not set or is invalid.
///
/// Idempotent. If another global subscriber is already installed the call
/// is a no-op.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("FOPS_LOG")
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let json_layer = config.json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
        });
        let text_layer = (!config.json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
        });

        let _ = tracing_subscriber::registry()
            .with(json_layer)
            .with(text_layer)
            .with(filter)
            .try_init();
    });
}
