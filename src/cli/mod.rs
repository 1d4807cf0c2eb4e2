pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, GraphArgs, PruneArgs, SourceArgs};
pub use output::{OutputFormat, OutputFormatter};
