use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prune protobuf sources down to the RPCs carrying selected options
#[derive(Parser, Debug)]
#[command(
    name = "protomod",
    about = "Prune protobuf sources down to the RPCs carrying selected options",
    version,
    author,
    long_about = "protomod rewrites a tree of .proto files so that it only contains the RPC \
                  methods annotated with selected method options, together with every message \
                  and enum they transitively depend on. Files left without content are not \
                  written and imports of dropped files are removed."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Write pruned copies of the proto sources",
        long_about = "Keeps RPCs whose method options match one of the given option names, plus \
                      everything they reference, and writes the remaining files under the \
                      destination directory at the same relative paths.\n\n\
                      Examples:\n  \
                      protomod prune -s protos -d out -n acme.api.public\n  \
                      protomod prune -s vendor -s protos -d out -n a.opt -n b.opt\n  \
                      protomod prune -s protos -d out --dry-run --format json"
    )]
    Prune(PruneArgs),

    #[command(
        about = "Print the usage graph",
        long_about = "Builds the usage graph without writing files and prints every node with \
                      its keep flag and references.\n\n\
                      Examples:\n  \
                      protomod graph -s protos -n acme.api.public --kept-only\n  \
                      protomod graph -s protos --format yaml"
    )]
    Graph(GraphArgs),
}

/// Arguments shared by every command that reads sources
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(
        short = 's',
        long = "source-dir",
        value_name = "DIR",
        required = true,
        help = "Source directory of protobuf files (repeatable)"
    )]
    pub source_dirs: Vec<PathBuf>,

    #[arg(
        short = 'n',
        long = "option-name",
        value_name = "OPTION",
        help = "Keep RPCs carrying this method option (repeatable; omit to keep any RPC with options)"
    )]
    pub option_names: Vec<String>,

    #[arg(
        long = "keep-package",
        value_name = "PKG",
        help = "Always keep types from this package (repeatable; defaults to PROTOMOD_KEEP_PACKAGES)"
    )]
    pub keep_packages: Vec<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct PruneArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[arg(
        short = 'd',
        long = "dest-dir",
        value_name = "DIR",
        required_unless_present = "dry_run",
        help = "Destination directory of generated protobuf files"
    )]
    pub dest_dir: Option<PathBuf>,

    #[arg(long, help = "Compute the result without writing files")]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[arg(long, help = "Only list nodes that are kept")]
    pub kept_only: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_prune_args() {
        let args = CliArgs::parse_from([
            "protomod", "prune", "-s", "a", "--source-dir", "b", "-d", "out", "-n", "x.opt", "-n",
            "y.opt",
        ]);
        match args.command {
            Commands::Prune(prune) => {
                assert_eq!(
                    prune.sources.source_dirs,
                    vec![PathBuf::from("a"), PathBuf::from("b")]
                );
                assert_eq!(prune.dest_dir, Some(PathBuf::from("out")));
                assert_eq!(prune.sources.option_names, vec!["x.opt", "y.opt"]);
                assert!(prune.sources.keep_packages.is_empty());
                assert_eq!(prune.sources.format, OutputFormatArg::Human);
                assert!(!prune.dry_run);
            }
            _ => panic!("Expected Prune command"),
        }
    }

    #[test]
    fn test_prune_requires_source_dir() {
        let result = CliArgs::try_parse_from(["protomod", "prune", "-d", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_prune_requires_dest_unless_dry_run() {
        assert!(CliArgs::try_parse_from(["protomod", "prune", "-s", "a"]).is_err());

        let args = CliArgs::try_parse_from(["protomod", "prune", "-s", "a", "--dry-run"]).unwrap();
        match args.command {
            Commands::Prune(prune) => {
                assert!(prune.dry_run);
                assert!(prune.dest_dir.is_none());
            }
            _ => panic!("Expected Prune command"),
        }
    }

    #[test]
    fn test_graph_args() {
        let args = CliArgs::parse_from([
            "protomod",
            "graph",
            "-s",
            "protos",
            "--keep-package",
            "acme.common",
            "--kept-only",
            "--format",
            "yaml",
        ]);
        match args.command {
            Commands::Graph(graph) => {
                assert!(graph.kept_only);
                assert_eq!(graph.sources.keep_packages, vec!["acme.common"]);
                assert_eq!(graph.sources.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Graph command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["protomod", "-v", "graph", "-s", "p"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["protomod", "graph", "-s", "p", "--log-level", "trace"]);
        assert_eq!(args.log_level, Some("trace".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["protomod", "-v", "-q", "graph", "-s", "p"]).is_err());
    }
}
