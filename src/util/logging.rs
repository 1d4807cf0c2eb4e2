//! Structured logging setup for protomod
//!
//! Logs always go to stderr so that reports printed on stdout stay machine
//! readable. The subscriber can be installed once per process; later calls
//! are ignored.
//!
//! # Example
//!
//! ```no_run
//! use protomod::util::logging;
//! use tracing::info;
//!
//! logging::init_from_env();
//! info!(files = 3, "Scanned source directories");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for protomod's own events
    pub level: Level,

    /// Emit JSON lines instead of human readable output
    pub use_json: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// JSON output with source locations, for log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_location: true,
        }
    }

    /// Human output at `level`, or the production layout when `json` is set
    pub fn for_level(level: Level, json: bool) -> Self {
        let base = if json {
            Self::production()
        } else {
            Self::default()
        };
        Self { level, ..base }
    }
}

/// Parses a log level from a string, falling back to `INFO`
///
/// ```
/// use protomod::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Picks the effective level from CLI flags and the environment
///
/// An explicit `--log-level` wins, then `--verbose`, then `--quiet`, then
/// `PROTOMOD_LOG_LEVEL`. `RUST_LOG` is applied on top by the filter itself.
pub fn resolve_level(explicit: Option<&str>, verbose: bool, quiet: bool) -> Level {
    if let Some(level_str) = explicit {
        parse_level(level_str)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        let level_str = env::var("PROTOMOD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    }
}

fn json_from_env() -> bool {
    env::var("PROTOMOD_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Installs the global subscriber
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("protomod={}", config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Initializes logging from CLI flags, honoring `PROTOMOD_LOG_JSON`
pub fn init_from_args(explicit: Option<&str>, verbose: bool, quiet: bool) {
    init_logging(LoggingConfig::for_level(
        resolve_level(explicit, verbose, quiet),
        json_from_env(),
    ));
}

/// Initializes logging from `PROTOMOD_LOG_LEVEL` and `PROTOMOD_LOG_JSON`
pub fn init_from_env() {
    init_from_args(None, false, false);
}
