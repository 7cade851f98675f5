//! Tracing subscriber setup for the CLI
//!
//! The filter comes from `GSTBILL_LOG` when set; otherwise only warnings
//! from this crate are shown, or debug output with `--verbose`. Logs go
//! to stderr so that exported JSON/CSV on stdout stays clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "GSTBILL_LOG";

/// Build the filter used by [`init_cli_logger`]
pub fn cli_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "gstbill_cli=debug,warn"
    } else {
        "gstbill_cli=warn"
    };

    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_cli_logger(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(cli_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
