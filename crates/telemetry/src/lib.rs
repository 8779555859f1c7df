//! Tracing subscriber bootstrap.

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Builds the filter from `RUST_LOG`, falling back to the configured
/// directives.
fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .map_err(|err| anyhow::anyhow!("invalid telemetry.log_filter: {err}")),
    }
}

/// Install the global subscriber. A second call is a no-op so tests and the
/// CLI can both call it.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.with_target(true).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            target: "bookstore-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }
    Ok(())
}
