//! Logging initialization.
//!
//! Logs go to stderr so stdout stays clean for JSON output. `RUST_LOG`
//! overrides the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Filter directive for the configured level, raised to at least `debug` by
/// `--verbose`. Unknown levels fall back to `info`.
fn default_directive(level: &str, verbose: bool) -> &'static str {
    let configured = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(level.trim()))
        .unwrap_or(2);
    let index = if verbose { configured.max(3) } else { configured };
    LEVELS[index]
}

/// Install the global subscriber.
pub fn init(default_level: &str, json_format: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section plus CLI overrides.
pub fn init_from_config(
    config: &vitrina_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = default_directive(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format.eq_ignore_ascii_case("json");
    init(level, json_format);
}
