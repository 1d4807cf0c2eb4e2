use crate::graph::{NodeKind, UsageGraph};
use serde::Serialize;

/// A file that could not be read, parsed or written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a prune run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub dry_run: bool,
    pub files_scanned: usize,
    /// Relative paths written, or that would be written on a dry run
    pub files_written: Vec<String>,
    /// Parsed files with nothing left to keep
    pub files_skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub kept_rpcs: Vec<String>,
    pub dropped_rpcs: Vec<String>,
    pub kept_messages: usize,
    pub kept_enums: usize,
}

impl PruneReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit code: 1 when any file failed
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub(crate) fn record_graph(&mut self, graph: &UsageGraph) {
        for (_, node) in graph.nodes() {
            match node.kind {
                NodeKind::Rpc if node.keep => self.kept_rpcs.push(node.key.to_string()),
                NodeKind::Rpc => self.dropped_rpcs.push(node.key.to_string()),
                NodeKind::Message if node.keep && node.declared => self.kept_messages += 1,
                NodeKind::Enum if node.keep && node.declared => self.kept_enums += 1,
                _ => {}
            }
        }
        self.kept_rpcs.sort();
        self.dropped_rpcs.sort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNodeReport {
    pub kind: NodeKind,
    pub package: String,
    pub name: String,
    pub keep: bool,
    pub declared: bool,
    /// Fully qualified names of referenced nodes
    pub children: Vec<String>,
}

/// Serializable view of a usage graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphReport {
    pub files_scanned: usize,
    pub total_nodes: usize,
    pub kept_nodes: usize,
    pub nodes: Vec<GraphNodeReport>,
    pub failures: Vec<FileFailure>,
}

impl GraphReport {
    pub fn from_graph(graph: &UsageGraph, kept_only: bool) -> Self {
        let mut nodes: Vec<GraphNodeReport> = graph
            .nodes()
            .map(|(_, node)| node)
            .filter(|node| !kept_only || node.keep)
            .map(|node| {
                let mut children: Vec<String> = node
                    .children
                    .iter()
                    .map(|&child| graph.node(child).key.to_string())
                    .collect();
                children.sort();
                GraphNodeReport {
                    kind: node.kind,
                    package: node.key.package.clone(),
                    name: node.key.name.clone(),
                    keep: node.keep,
                    declared: node.declared,
                    children,
                }
            })
            .collect();
        nodes.sort_by(|a, b| (&a.package, &a.name).cmp(&(&b.package, &b.name)));

        Self {
            files_scanned: 0,
            total_nodes: graph.len(),
            kept_nodes: graph.nodes().filter(|(_, n)| n.keep).count(),
            nodes,
            failures: Vec::new(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}
