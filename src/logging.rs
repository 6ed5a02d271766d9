//! Structured logging setup.
//!
//! Logs go to stderr through `tracing-subscriber` so that stdout stays
//! reserved for command output (including `--json` documents). `RUST_LOG`
//! overrides the configured level when set.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for funcscan's own events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(level: Level, use_json: bool) -> Self {
        Self { level, use_json }
    }
}

/// Parse a level name, case-insensitive.
pub fn parse_level(level_str: &str) -> Result<Level, String> {
    match level_str.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(format!(
            "invalid log level '{}', expected one of: trace, debug, info, warn, error",
            other
        )),
    }
}

fn default_directives(level: Level) -> String {
    format!(
        "funcscan={},reqwest=warn,hyper=warn",
        level.as_str().to_ascii_lowercase()
    )
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = match env::var("RUST_LOG") {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
            _ => EnvFilter::new(default_directives(config.level)),
        };

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("[warn] logging already initialized: {}", e);
        }
    });
}
