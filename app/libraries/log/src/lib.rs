use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn into_tracing_level(&self) -> LevelFilter {
        match self {
            &LogLevel::Off => LevelFilter::OFF,
            &LogLevel::Error => LevelFilter::ERROR,
            &LogLevel::Warn => LevelFilter::WARN,
            &LogLevel::Info => LevelFilter::INFO,
            &LogLevel::Debug => LevelFilter::DEBUG,
            &LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` directives, when present,
/// refine the configured level.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into_tracing_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_names_match_config_file() {
        let level: LogLevel = serde_json::from_str("\"Debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(level.into_tracing_level(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
