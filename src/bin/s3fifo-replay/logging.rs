//! Diagnostic logging for the replay driver.
//!
//! Stdout carries the interval table and the final summary, which are meant
//! to be piped or diffed between runs. Every tracing event therefore goes to
//! stderr, whatever the format.

use crate::config::LoggingConfig;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    /// Unrecognized names fall back to `Pretty`.
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer().with_writer(std::io::stderr);
        match self {
            Self::Pretty => layer.boxed(),
            Self::Compact => layer.compact().boxed(),
            Self::Json => layer.json().boxed(),
        }
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured level.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(LogFormat::from_name(&config.format).layer())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("Compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("syslog"), LogFormat::Pretty);
    }
}
