//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "cli_handle=info";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `cli_handle=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
}

/// Initialize logging with an explicit filter, e.g. the configured level.
///
/// A bare level such as `debug` is scoped to this crate; anything else is
/// handed to [`EnvFilter`] as a full directive string.
pub fn init_with_level(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
}

fn filter_for(level: &str) -> EnvFilter {
    let directive = match level {
        "error" | "warn" | "info" | "debug" | "trace" => format!("cli_handle={}", level),
        other => other.to_string(),
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        // Whichever call comes first wins; neither may panic.
        let _ = try_init();
        let _ = try_init();
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init();

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
    }

    #[test]
    fn test_filter_for_bare_level() {
        let filter = filter_for("debug");
        assert!(filter.to_string().contains("cli_handle=debug"));
    }

    #[test]
    fn test_filter_for_directive() {
        let filter = filter_for("cli_handle::engine=trace");
        assert!(filter.to_string().contains("cli_handle::engine=trace"));
    }
}
