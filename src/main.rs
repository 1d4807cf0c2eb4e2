use protomod::cli::commands::{CliArgs, Commands};
use protomod::cli::handlers::{handle_graph, handle_prune};
use protomod::util::logging;
use protomod::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    logging::init_from_args(args.log_level.as_deref(), args.verbose, args.quiet);

    debug!("protomod v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Prune(prune_args) => handle_prune(prune_args),
        Commands::Graph(graph_args) => handle_graph(graph_args),
    };

    std::process::exit(exit_code);
}
