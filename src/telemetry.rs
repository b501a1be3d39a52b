use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a
/// subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        _ => builder.json().try_init(),
    };
    installed.is_ok()
}
