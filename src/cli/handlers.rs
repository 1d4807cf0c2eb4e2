//! Command handlers returning process exit codes

use anyhow::{Context, Result};
use tracing::{debug, error};

use super::commands::{GraphArgs, PruneArgs, SourceArgs};
use super::output::OutputFormatter;
use crate::config::ProtomodConfig;
use crate::graph::OptionFilter;
use crate::modifier::{ModifierOptions, ProtoModifier};

pub fn handle_prune(args: &PruneArgs) -> i32 {
    report_exit(run_prune(args))
}

pub fn handle_graph(args: &GraphArgs) -> i32 {
    report_exit(run_graph(args))
}

fn report_exit(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn modifier_options(sources: &SourceArgs) -> Result<ModifierOptions> {
    let config = ProtomodConfig::default().with_keep_packages(&sources.keep_packages);
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);

    Ok(
        ModifierOptions::from_config(sources.source_dirs.clone(), &config)
            .with_filter(OptionFilter::new(sources.option_names.iter().cloned())),
    )
}

fn run_prune(args: &PruneArgs) -> Result<i32> {
    let mut options = modifier_options(&args.sources)?.with_dry_run(args.dry_run);
    if let Some(dest) = &args.dest_dir {
        options = options.with_dest_dir(dest);
    }

    let report = ProtoModifier::new(options)
        .run()
        .context("Prune failed")?;

    let formatter = OutputFormatter::new(args.sources.format.into());
    println!("{}", formatter.format_prune(&report)?);
    Ok(report.exit_code())
}

fn run_graph(args: &GraphArgs) -> Result<i32> {
    let options = modifier_options(&args.sources)?;
    let report = ProtoModifier::new(options)
        .graph_report(args.kept_only)
        .context("Failed to build usage graph")?;

    let formatter = OutputFormatter::new(args.sources.format.into());
    println!("{}", formatter.format_graph(&report)?);
    Ok(report.exit_code())
}
