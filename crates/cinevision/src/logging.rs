//! Process-wide log setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::LogFormat;

pub const DEFAULT_FILTER: &str = "info,cinevision=debug,cinevision_server=debug";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Records sent through the `log` facade are forwarded to `tracing`.
pub fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(fmt::layer().with_target(true)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(true))),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json);

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    tracing::debug!(?format, "Logging initialized");
    Ok(())
}
