//! Output formatting for multiple formats
//!
//! Reports are rendered as JSON, YAML or human-readable text. Machine formats
//! serialize the report types directly.
//!
//! # Example
//!
//! ```no_run
//! use protomod::cli::output::{OutputFormat, OutputFormatter};
//! use protomod::PruneReport;
//!
//! let report = PruneReport::default();
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_prune(&report).unwrap());
//! ```

use anyhow::{Context, Result};
use serde::Serialize;

use crate::modifier::{FileFailure, GraphReport, PruneReport};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_prune(&self, report: &PruneReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "prune report"),
            OutputFormat::Yaml => to_yaml(report, "prune report"),
            OutputFormat::Human => Ok(self.format_prune_human(report)),
        }
    }

    pub fn format_graph(&self, report: &GraphReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "graph report"),
            OutputFormat::Yaml => to_yaml(report, "graph report"),
            OutputFormat::Human => Ok(self.format_graph_human(report)),
        }
    }

    fn format_prune_human(&self, report: &PruneReport) -> String {
        let mut output = String::new();

        if report.is_success() {
            output.push_str("\u{2713} Prune Result");
        } else {
            output.push_str("\u{26A0} Prune Result (with failures)");
        }
        if report.dry_run {
            output.push_str(" [dry run]");
        }
        output.push('\n');
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Files scanned:  {}\n", report.files_scanned));
        let written_label = if report.dry_run {
            "Files to write"
        } else {
            "Files written"
        };
        output.push_str(&format!("{}:  {}\n", written_label, report.files_written.len()));
        output.push_str(&format!("Files skipped:  {}\n", report.files_skipped.len()));
        output.push_str(&format!("Kept messages:  {}\n", report.kept_messages));
        output.push_str(&format!("Kept enums:     {}\n\n", report.kept_enums));

        push_tree(&mut output, "Kept RPCs", &report.kept_rpcs);
        push_tree(&mut output, "Dropped RPCs", &report.dropped_rpcs);
        push_tree(&mut output, written_label, &report.files_written);
        push_failures(&mut output, &report.failures);

        output
    }

    fn format_graph_human(&self, report: &GraphReport) -> String {
        let mut output = String::new();

        output.push_str("Usage Graph\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!(
            "Files scanned: {}  Nodes: {}  Kept: {}\n\n",
            report.files_scanned, report.total_nodes, report.kept_nodes
        ));

        for node in &report.nodes {
            let mark = if node.keep { "\u{2713}" } else { "\u{2717}" };
            let qualified = if node.package.is_empty() {
                node.name.clone()
            } else {
                format!("{}.{}", node.package, node.name)
            };
            output.push_str(&format!("{} {:<8} {}\n", mark, node.kind, qualified));
            for (i, child) in node.children.iter().enumerate() {
                let connector = if i == node.children.len() - 1 {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!("    {}\u{2500} {}\n", connector, child));
            }
        }

        push_failures(&mut output, &report.failures);
        output
    }
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn push_tree(output: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        output.push_str(&format!("{}: (none)\n\n", title));
        return;
    }
    output.push_str(&format!("{}:\n", title));
    for (i, item) in items.iter().enumerate() {
        let connector = if i == items.len() - 1 {
            "\u{2514}"
        } else {
            "\u{251C}"
        };
        output.push_str(&format!("{}\u{2500} {}\n", connector, item));
    }
    output.push('\n');
}

fn push_failures(output: &mut String, failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    output.push_str("\u{26A0} Failures:\n");
    for failure in failures {
        output.push_str(&format!("  - {}: {}\n", failure.path, failure.error));
    }
}
