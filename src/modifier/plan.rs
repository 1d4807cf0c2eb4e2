use super::{FileFailure, ParsedFile};
use crate::graph::{resolve_type, UsageGraph};
use crate::proto::ast::{FileItem, ProtoFile};
use crate::proto::Retain;
use std::collections::BTreeSet;

/// Decides which files are written and what each one keeps
///
/// A file is rendered when it declares a kept top-level message or enum, a
/// kept RPC, or extends a kept type. Imports survive when they point at a
/// rendered file or at a file outside the scanned sources. Sources that failed
/// to load still count as scanned, so imports of them are dropped.
pub struct RenderPlan<'g> {
    graph: &'g UsageGraph,
    sources: BTreeSet<String>,
    rendered: BTreeSet<String>,
}

impl<'g> RenderPlan<'g> {
    pub fn new(graph: &'g UsageGraph, files: &[ParsedFile], failures: &[FileFailure]) -> Self {
        let sources = files
            .iter()
            .map(|f| f.relative.clone())
            .chain(failures.iter().map(|f| f.path.clone()))
            .collect();
        let rendered = files
            .iter()
            .filter(|f| has_kept_content(graph, &f.ast))
            .map(|f| f.relative.clone())
            .collect();
        Self {
            graph,
            sources,
            rendered,
        }
    }

    pub fn is_rendered(&self, relative: &str) -> bool {
        self.rendered.contains(relative)
    }

    pub fn rendered(&self) -> impl Iterator<Item = &str> {
        self.rendered.iter().map(String::as_str)
    }
}

impl Retain for RenderPlan<'_> {
    fn keep_import(&self, path: &str) -> bool {
        self.rendered.contains(path) || !self.sources.contains(path)
    }

    fn keep_message(&self, package: &str, name: &str) -> bool {
        self.graph.is_kept(package, name)
    }

    fn keep_enum(&self, package: &str, name: &str) -> bool {
        self.graph.is_kept(package, name)
    }

    fn keep_method(&self, package: &str, service: &str, method: &str) -> bool {
        self.graph
            .is_kept(package, &format!("{}.{}", service, method))
    }
}

fn has_kept_content(graph: &UsageGraph, file: &ProtoFile) -> bool {
    let package = file.package();
    file.items.iter().any(|item| match item {
        FileItem::Message(message) => graph.is_kept(package, &message.name),
        FileItem::Enum(e) => graph.is_kept(package, &e.name),
        FileItem::Service(service) => service
            .methods()
            .any(|m| graph.is_kept(package, &format!("{}.{}", service.name, m.name))),
        FileItem::Extend(extend) => resolve_type(graph, package, &extend.extendee)
            .and_then(|resolved| {
                let name = resolved.chain.last()?.clone();
                Some(graph.is_kept(&resolved.package, &name))
            })
            .unwrap_or(false),
        _ => false,
    })
}
