//! Logging configuration
//!
//! Progress is reported through `tracing`. `RUST_LOG` wins when set;
//! otherwise the level follows `--verbose`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level used when `RUST_LOG` is not set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
}

impl LogLevel {
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub level: LogLevel,
    /// Emit ANSI colors on stderr
    pub ansi: bool,
}

impl LogOptions {
    pub fn new(verbose: bool, ansi: bool) -> Self {
        let level = if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
        Self { level, ansi }
    }
}

/// Install the global subscriber. Logs always go to stderr so that
/// `--json` output on stdout stays machine-readable.
pub fn init_logging(options: LogOptions) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.level.to_filter_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(options.ansi)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init()
}
