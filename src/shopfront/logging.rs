//! Structured logging via `tracing`.
//!
//! Logs go to stderr so that `--json` output on stdout stays machine readable.
//! `SHOPFRONT_LOG` takes any `EnvFilter` directive and wins over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV_VAR: &str = "SHOPFRONT_LOG";

/// Builds the filter: env var first, then `verbose`, then the configured level.
pub fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { level };
        EnvFilter::new(format!("shopfront={}", level))
    })
}

/// Installs the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_logging(level: &str, verbose: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(build_filter(level, verbose))
        .try_init();
}
