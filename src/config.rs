//! Configuration management for protomod
//!
//! Settings are loaded from environment variables with defaults and may be
//! overridden by command line flags.
//!
//! # Environment Variables
//!
//! - `PROTOMOD_LOG_LEVEL`: Logging level - default: "info"
//! - `PROTOMOD_LOG_JSON`: Emit logs as JSON (true|false) - default: "false"
//! - `PROTOMOD_KEEP_PACKAGES`: Comma-separated packages whose types are always
//!   kept - default: "google.protobuf"
//! - `PROTOMOD_MAX_DEPTH`: Maximum directory depth when scanning sources - default: "64"
//! - `PROTOMOD_FOLLOW_LINKS`: Follow symbolic links while scanning (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use protomod::ProtomodConfig;
//!
//! let config = ProtomodConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::graph::DEFAULT_KEEP_PACKAGE;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_DEPTH: usize = 64;
const DEFAULT_FOLLOW_LINKS: bool = false;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid package name: '{0}'")]
    InvalidPackage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtomodConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Packages seeding the keep set in addition to the selected RPCs
    pub keep_packages: Vec<String>,

    /// Maximum directory depth when discovering `.proto` files
    pub max_depth: usize,

    /// Follow symbolic links while discovering files
    pub follow_links: bool,
}

impl Default for ProtomodConfig {
    /// Loads `PROTOMOD_*` environment variables, falling back to defaults
    fn default() -> Self {
        let log_level = env::var("PROTOMOD_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let keep_packages = env::var("PROTOMOD_KEEP_PACKAGES")
            .ok()
            .map(|v| parse_package_list(&v))
            .unwrap_or_else(|| vec![DEFAULT_KEEP_PACKAGE.to_string()]);

        let max_depth = env::var("PROTOMOD_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let follow_links = env::var("PROTOMOD_FOLLOW_LINKS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_FOLLOW_LINKS);

        Self {
            log_level,
            keep_packages,
            max_depth,
            follow_links,
        }
    }
}

fn parse_package_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn is_valid_package(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl ProtomodConfig {
    /// Replaces the keep packages when any were given on the command line
    pub fn with_keep_packages(mut self, packages: &[String]) -> Self {
        if !packages.is_empty() {
            self.keep_packages = packages.to_vec();
        }
        self
    }

    /// Checks log level, scan depth and package names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max depth must be at least 1".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if let Some(bad) = self.keep_packages.iter().find(|p| !is_valid_package(p)) {
            return Err(ConfigError::InvalidPackage(bad.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for ProtomodConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Protomod Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Keep Packages: {}", self.keep_packages.join(", "))?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Follow Links: {}", self.follow_links)?;
        Ok(())
    }
}
