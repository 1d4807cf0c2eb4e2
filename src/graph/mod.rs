//! Usage graph linking RPCs to the messages and enums they depend on
//!
//! Nodes live in an arena indexed by [`NodeId`]; a key index maps each
//! `(package, name)` pair to its node. After [`UsageGraph::propagate`] every
//! node reachable from a seed carries `keep = true`.

mod builder;
mod filter;
mod resolve;

pub use builder::{build_graph, GraphBuilder};
pub use filter::OptionFilter;
pub use resolve::{is_scalar_type, resolve_type, ResolvedType};

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Package applied to propagation seeds when none are configured
pub const DEFAULT_KEEP_PACKAGE: &str = "google.protobuf";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub package: String,
    /// Simple type name, or `Service.Method` for RPCs
    pub name: String,
}

impl NodeKey {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Rpc,
    Message,
    Enum,
    Extend,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Rpc => "rpc",
            NodeKind::Message => "message",
            NodeKind::Enum => "enum",
            NodeKind::Extend => "extend",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct UsageNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub keep: bool,
    /// False while the node only exists because something referenced it
    pub declared: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UsageGraph {
    nodes: Vec<UsageNode>,
    index: HashMap<NodeKey, NodeId>,
}

impl UsageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &UsageNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node(&self, id: NodeId) -> &UsageNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, package: &str, name: &str) -> Option<&UsageNode> {
        self.find(&NodeKey::new(package, name))
            .map(|id| self.node(id))
    }

    pub fn is_declared(&self, package: &str, name: &str) -> bool {
        self.get(package, name).is_some_and(|n| n.declared)
    }

    pub fn is_kept(&self, package: &str, name: &str) -> bool {
        self.get(package, name).is_some_and(|n| n.keep)
    }

    fn insert(&mut self, key: NodeKey, kind: NodeKind, declared: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(key.clone(), id);
        self.nodes.push(UsageNode {
            key,
            kind,
            children: Vec::new(),
            keep: false,
            declared,
        });
        id
    }

    /// Registers a declaration, upgrading an existing placeholder in place
    pub fn declare(&mut self, key: NodeKey, kind: NodeKind) -> NodeId {
        match self.find(&key) {
            Some(id) => {
                let node = &mut self.nodes[id.0];
                node.kind = kind;
                node.declared = true;
                id
            }
            None => self.insert(key, kind, true),
        }
    }

    /// Returns the node for a referenced type, creating a placeholder if needed
    pub fn reference(&mut self, key: NodeKey) -> NodeId {
        match self.find(&key) {
            Some(id) => id,
            None => self.insert(key, NodeKind::Message, false),
        }
    }

    /// Marks a node as an extension target unless it is a real declaration
    pub fn mark_extended(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        if !node.declared {
            node.kind = NodeKind::Extend;
        }
    }

    pub fn set_keep(&mut self, id: NodeId, keep: bool) {
        self.nodes[id.0].keep = keep;
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        let children = &mut self.nodes[from.0].children;
        if !children.contains(&to) {
            children.push(to);
        }
    }

    /// Marks every node reachable from a seed as kept
    ///
    /// Seeds are nodes already flagged `keep` (selected RPCs) plus every node
    /// whose package appears in `keep_packages`. Returns the kept node count.
    pub fn propagate(&mut self, keep_packages: &[String]) -> usize {
        let packages: HashSet<&str> = keep_packages.iter().map(String::as_str).collect();
        let mut stack: Vec<NodeId> = self
            .nodes()
            .filter(|(_, n)| n.keep || packages.contains(n.key.package.as_str()))
            .map(|(id, _)| id)
            .collect();

        let mut visited = vec![false; self.nodes.len()];
        while let Some(id) = stack.pop() {
            if visited[id.0] {
                continue;
            }
            visited[id.0] = true;
            self.nodes[id.0].keep = true;
            stack.extend(
                self.nodes[id.0]
                    .children
                    .iter()
                    .copied()
                    .filter(|child| !visited[child.0]),
            );
        }

        self.nodes.iter().filter(|n| n.keep).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_upgrades_placeholder() {
        let mut graph = UsageGraph::new();
        let placeholder = graph.reference(NodeKey::new("a", "Thing"));
        assert!(!graph.node(placeholder).declared);

        let declared = graph.declare(NodeKey::new("a", "Thing"), NodeKind::Enum);
        assert_eq!(placeholder, declared);
        assert_eq!(graph.node(declared).kind, NodeKind::Enum);
        assert!(graph.is_declared("a", "Thing"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_mark_extended_only_touches_placeholders() {
        let mut graph = UsageGraph::new();
        let external = graph.reference(NodeKey::new("google.protobuf", "MethodOptions"));
        let local = graph.declare(NodeKey::new("a", "Local"), NodeKind::Message);

        graph.mark_extended(external);
        graph.mark_extended(local);

        assert_eq!(graph.node(external).kind, NodeKind::Extend);
        assert_eq!(graph.node(local).kind, NodeKind::Message);
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let mut graph = UsageGraph::new();
        let a = graph.declare(NodeKey::new("p", "A"), NodeKind::Message);
        let b = graph.declare(NodeKey::new("p", "B"), NodeKind::Message);
        graph.add_edge(a, b);
        graph.add_edge(a, b);
        assert_eq!(graph.node(a).children, vec![b]);
    }

    #[test]
    fn test_propagate_from_rpc_and_package_seeds() {
        let mut graph = UsageGraph::new();
        let rpc = graph.declare(NodeKey::new("p", "Svc.Get"), NodeKind::Rpc);
        let req = graph.declare(NodeKey::new("p", "Req"), NodeKind::Message);
        let inner = graph.declare(NodeKey::new("p", "Inner"), NodeKind::Enum);
        let unused = graph.declare(NodeKey::new("p", "Unused"), NodeKind::Message);
        let opts = graph.reference(NodeKey::new("google.protobuf", "MethodOptions"));
        let ext = graph.declare(NodeKey::new("p", "Visibility"), NodeKind::Message);

        graph.add_edge(rpc, req);
        graph.add_edge(req, inner);
        graph.add_edge(inner, req);
        graph.add_edge(opts, ext);
        graph.set_keep(rpc, true);

        let kept = graph.propagate(&[DEFAULT_KEEP_PACKAGE.to_string()]);

        assert_eq!(kept, 5);
        assert!(graph.is_kept("p", "Req"));
        assert!(graph.is_kept("p", "Inner"));
        assert!(graph.is_kept("p", "Visibility"));
        assert!(!graph.node(unused).keep);
    }

    #[test]
    fn test_propagate_without_seeds_keeps_nothing() {
        let mut graph = UsageGraph::new();
        graph.declare(NodeKey::new("p", "A"), NodeKind::Message);
        assert_eq!(graph.propagate(&[]), 0);
    }

    #[test]
    fn test_node_key_display() {
        assert_eq!(NodeKey::new("a.b", "C").to_string(), "a.b.C");
        assert_eq!(NodeKey::new("", "C").to_string(), "C");
    }
}
