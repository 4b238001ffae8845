//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, LogFormat};

/// `RUST_LOG` when set, otherwise the verbosity's default filter
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_log_filter()))
}

/// Install the global subscriber, writing to stderr
///
/// A second call is a no-op.
pub fn init(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.log_format {
        LogFormat::Text => builder.with_ansi(config.color.should_color()).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
