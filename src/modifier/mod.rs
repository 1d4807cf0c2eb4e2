//! Prunes a tree of `.proto` files down to selected RPCs
//!
//! [`ProtoModifier::run`] discovers sources, parses each file once, builds the
//! usage graph, decides which files still have content and writes the pruned
//! files under the destination directory. Per-file failures are recorded in
//! the [`PruneReport`] and do not stop the run.

mod discovery;
mod plan;
mod report;

pub use discovery::{discover, SourceFile, WalkOptions};
pub use plan::RenderPlan;
pub use report::{FileFailure, GraphNodeReport, GraphReport, PruneReport};

use crate::config::ProtomodConfig;
use crate::graph::{build_graph, OptionFilter, UsageGraph};
use crate::proto::{parse, print_file, ParseError, ProtoFile};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ModifierError {
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No source directories given")]
    NoSources,

    #[error("A destination directory is required unless running dry")]
    MissingDestination,
}

/// Failure affecting a single file
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read: {0}")]
    Read(#[source] io::Error),

    #[error("failed to parse: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ModifierOptions {
    pub source_dirs: Vec<PathBuf>,
    pub dest_dir: Option<PathBuf>,
    pub filter: OptionFilter,
    pub keep_packages: Vec<String>,
    pub dry_run: bool,
    pub max_depth: usize,
    pub follow_links: bool,
}

impl ModifierOptions {
    /// Options for `source_dirs` with scan settings and keep packages from `config`
    pub fn from_config(source_dirs: Vec<PathBuf>, config: &ProtomodConfig) -> Self {
        Self {
            source_dirs,
            dest_dir: None,
            filter: OptionFilter::any(),
            keep_packages: config.keep_packages.clone(),
            dry_run: false,
            max_depth: config.max_depth,
            follow_links: config.follow_links,
        }
    }

    pub fn with_dest_dir(mut self, dest_dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(dest_dir.into());
        self
    }

    pub fn with_filter(mut self, filter: OptionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A source file and its syntax tree
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub relative: String,
    pub path: PathBuf,
    pub ast: ProtoFile,
}

/// Parsed sources and the usage graph built from them
#[derive(Debug)]
pub struct Analysis {
    pub files_scanned: usize,
    pub files: Vec<ParsedFile>,
    pub failures: Vec<FileFailure>,
    pub graph: UsageGraph,
}

pub struct ProtoModifier {
    options: ModifierOptions,
}

impl ProtoModifier {
    pub fn new(options: ModifierOptions) -> Self {
        Self { options }
    }

    /// Discovers, parses and builds the propagated usage graph
    pub fn analyze(&self) -> Result<Analysis, ModifierError> {
        if self.options.source_dirs.is_empty() {
            return Err(ModifierError::NoSources);
        }

        let sources = discover(
            &self.options.source_dirs,
            WalkOptions {
                max_depth: self.options.max_depth,
                follow_links: self.options.follow_links,
            },
        )?;
        info!(files = sources.len(), "Discovered proto files");

        let files_scanned = sources.len();
        let mut files = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();

        for source in sources {
            match load_file(&source.path) {
                Ok(ast) => {
                    debug!(file = %source.relative, "Parsed");
                    files.push(ParsedFile {
                        relative: source.relative,
                        path: source.path,
                        ast,
                    });
                }
                Err(e) => {
                    error!(file = %source.relative, error = %e, "Skipping file");
                    failures.push(FileFailure {
                        path: source.relative,
                        error: e.to_string(),
                    });
                }
            }
        }

        let graph = build_graph(
            files.iter().map(|f| &f.ast),
            &self.options.filter,
            &self.options.keep_packages,
        );

        Ok(Analysis {
            files_scanned,
            files,
            failures,
            graph,
        })
    }

    /// Builds the graph report without writing anything
    pub fn graph_report(&self, kept_only: bool) -> Result<GraphReport, ModifierError> {
        let analysis = self.analyze()?;
        let mut report = GraphReport::from_graph(&analysis.graph, kept_only);
        report.files_scanned = analysis.files_scanned;
        report.failures = analysis.failures;
        Ok(report)
    }

    /// Prunes the sources and writes the result to the destination directory
    pub fn run(&self) -> Result<PruneReport, ModifierError> {
        let dest_dir = match (&self.options.dest_dir, self.options.dry_run) {
            (Some(dir), _) => Some(dir.as_path()),
            (None, true) => None,
            (None, false) => return Err(ModifierError::MissingDestination),
        };

        let analysis = self.analyze()?;
        let plan = RenderPlan::new(&analysis.graph, &analysis.files, &analysis.failures);

        let mut report = PruneReport {
            dry_run: self.options.dry_run,
            files_scanned: analysis.files_scanned,
            failures: analysis.failures.clone(),
            ..Default::default()
        };
        report.record_graph(&analysis.graph);

        for file in &analysis.files {
            if !plan.is_rendered(&file.relative) {
                debug!(file = %file.relative, "Nothing kept, skipping");
                report.files_skipped.push(file.relative.clone());
                continue;
            }

            let output = print_file(&file.ast, &plan);

            match dest_dir.filter(|_| !self.options.dry_run) {
                None => report.files_written.push(file.relative.clone()),
                Some(dir) => match write_file(dir, &file.relative, &output) {
                    Ok(path) => {
                        debug!(path = %path.display(), "Wrote pruned file");
                        report.files_written.push(file.relative.clone());
                    }
                    Err(e) => {
                        error!(file = %file.relative, error = %e, "Failed to write file");
                        report.failures.push(FileFailure {
                            path: file.relative.clone(),
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        if !report.failures.is_empty() {
            warn!(failures = report.failures.len(), "Some files could not be processed");
        }
        info!(
            written = report.files_written.len(),
            skipped = report.files_skipped.len(),
            kept_rpcs = report.kept_rpcs.len(),
            dropped_rpcs = report.dropped_rpcs.len(),
            dry_run = report.dry_run,
            "Prune completed"
        );

        Ok(report)
    }
}

fn load_file(path: &Path) -> Result<ProtoFile, FileError> {
    let source = fs::read_to_string(path).map_err(FileError::Read)?;
    Ok(parse(&source)?)
}

fn write_file(dest_dir: &Path, relative: &str, contents: &str) -> Result<PathBuf, FileError> {
    let path = relative
        .split('/')
        .fold(dest_dir.to_path_buf(), |acc, part| acc.join(part));
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
    };
    write().map_err(|source| FileError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
