//! protomod - prune protobuf sources down to selected RPCs
//!
//! Given one or more directories of `.proto` files and a list of method option
//! names, protomod keeps the RPC methods annotated with those options, every
//! message and enum they transitively reference, and drops the rest. The
//! pruned files are written to a destination directory with the same layout.
//!
//! # Example
//!
//! ```no_run
//! use protomod::{ModifierOptions, OptionFilter, ProtoModifier, ProtomodConfig};
//! use std::path::PathBuf;
//!
//! let config = ProtomodConfig::default();
//! let options = ModifierOptions::from_config(vec![PathBuf::from("protos")], &config)
//!     .with_dest_dir("out")
//!     .with_filter(OptionFilter::new(["acme.api.public"]));
//!
//! let report = ProtoModifier::new(options).run()?;
//! println!("wrote {} files", report.files_written.len());
//! # Ok::<(), protomod::ModifierError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`proto`]: lexer, parser, syntax tree and printer for `.proto` sources
//! - [`graph`]: usage graph, type resolution and keep propagation
//! - [`modifier`]: discovery, planning and writing of pruned files
//! - [`cli`]: command line parsing, handlers and report formatting

pub mod cli;
pub mod config;
pub mod graph;
pub mod modifier;
pub mod proto;
pub mod util;

pub use config::{ConfigError, ProtomodConfig};
pub use graph::{NodeKey, NodeKind, OptionFilter, UsageGraph};
pub use modifier::{
    GraphReport, ModifierError, ModifierOptions, ProtoModifier, PruneReport,
};
pub use proto::{parse, print_file, KeepAll, ParseError, ProtoFile, Retain};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_protomod() {
        assert_eq!(NAME, "protomod");
    }
}
