//! User-facing log levels.

use tracing_subscriber::EnvFilter;

/// `Error` logs errors only, `Detail` adds progress, `Info` logs everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    Error,
    Detail,
    Info,
}

impl LogLevel {
    /// Case-insensitive; unknown values fall back to [`LogLevel::Error`].
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "detail" => LogLevel::Detail,
            "info" => LogLevel::Info,
            _ => LogLevel::Error,
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Detail => "info",
            LogLevel::Info => "debug",
        }
    }

    /// `RUST_LOG` when set, otherwise this level for the pubtidy crates.
    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("error,pubtidy={}", self.directive())))
    }
}
