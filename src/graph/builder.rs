use super::{resolve_type, NodeId, NodeKey, NodeKind, OptionFilter, UsageGraph};
use crate::proto::ast::*;
use tracing::{debug, trace};

/// Builds a [`UsageGraph`] from parsed files in two passes
///
/// Every file must go through [`GraphBuilder::declare`] before any file goes
/// through [`GraphBuilder::link`], so that relative references can be resolved
/// against declarations from other files.
pub struct GraphBuilder<'a> {
    graph: UsageGraph,
    filter: &'a OptionFilter,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(filter: &'a OptionFilter) -> Self {
        Self {
            graph: UsageGraph::new(),
            filter,
        }
    }

    /// First pass: registers messages, groups and enums, nested ones included
    pub fn declare(&mut self, file: &ProtoFile) {
        let package = file.package();
        for item in &file.items {
            match item {
                FileItem::Message(message) => self.declare_message(package, message),
                FileItem::Enum(e) => {
                    self.graph
                        .declare(NodeKey::new(package, &e.name), NodeKind::Enum);
                }
                FileItem::Extend(extend) => self.declare_extend(package, extend),
                _ => {}
            }
        }
    }

    fn declare_message(&mut self, package: &str, message: &Message) {
        self.graph
            .declare(NodeKey::new(package, &message.name), NodeKind::Message);
        self.declare_elements(package, &message.elements);
    }

    fn declare_elements(&mut self, package: &str, elements: &[MessageElement]) {
        for element in elements {
            match element {
                MessageElement::Message(nested) => self.declare_message(package, nested),
                MessageElement::Enum(e) => {
                    self.graph
                        .declare(NodeKey::new(package, &e.name), NodeKind::Enum);
                }
                MessageElement::Group(group) => self.declare_group(package, group),
                MessageElement::Oneof(oneof) => {
                    for element in &oneof.elements {
                        if let OneofElement::Group(group) = element {
                            self.declare_group(package, group);
                        }
                    }
                }
                MessageElement::Extend(extend) => self.declare_extend(package, extend),
                _ => {}
            }
        }
    }

    fn declare_group(&mut self, package: &str, group: &Group) {
        self.graph
            .declare(NodeKey::new(package, &group.name), NodeKind::Message);
        self.declare_elements(package, &group.elements);
    }

    fn declare_extend(&mut self, package: &str, extend: &Extend) {
        for element in &extend.elements {
            if let ExtendElement::Group(group) = element {
                self.declare_group(package, group);
            }
        }
    }

    /// Second pass: adds dependency edges and creates RPC nodes
    pub fn link(&mut self, file: &ProtoFile) {
        let package = file.package();
        for item in &file.items {
            match item {
                FileItem::Message(message) => {
                    let id = self.message_node(package, &message.name);
                    self.link_elements(package, id, &message.elements);
                }
                FileItem::Extend(extend) => self.link_extend(package, extend),
                FileItem::Service(service) => self.link_service(package, service),
                _ => {}
            }
        }
    }

    fn message_node(&mut self, package: &str, name: &str) -> NodeId {
        self.graph.reference(NodeKey::new(package, name))
    }

    fn link_elements(&mut self, package: &str, parent: NodeId, elements: &[MessageElement]) {
        for element in elements {
            match element {
                MessageElement::Field(field) => self.link_type(package, parent, &field.type_name),
                MessageElement::Map(map) => {
                    self.link_type(package, parent, &map.key_type);
                    self.link_type(package, parent, &map.value_type);
                }
                MessageElement::Group(group) => self.link_group(package, parent, group),
                MessageElement::Oneof(oneof) => {
                    for element in &oneof.elements {
                        match element {
                            OneofElement::Field(field) => {
                                self.link_type(package, parent, &field.type_name)
                            }
                            OneofElement::Group(group) => self.link_group(package, parent, group),
                            OneofElement::Option(_) => {}
                        }
                    }
                }
                MessageElement::Message(nested) => {
                    let id = self.message_node(package, &nested.name);
                    self.graph.add_edge(parent, id);
                    self.link_elements(package, id, &nested.elements);
                }
                MessageElement::Enum(e) => {
                    let id = self.graph.reference(NodeKey::new(package, &e.name));
                    self.graph.add_edge(parent, id);
                }
                MessageElement::Extend(extend) => self.link_extend(package, extend),
                MessageElement::Option(_)
                | MessageElement::Reserved(_)
                | MessageElement::Extensions(_) => {}
            }
        }
    }

    fn link_group(&mut self, package: &str, parent: NodeId, group: &Group) {
        let id = self.message_node(package, &group.name);
        self.graph.add_edge(parent, id);
        self.link_elements(package, id, &group.elements);
    }

    fn link_extend(&mut self, package: &str, extend: &Extend) {
        let Some(target) = self.link_chain(package, None, &extend.extendee) else {
            return;
        };
        self.graph.mark_extended(target);
        for element in &extend.elements {
            match element {
                ExtendElement::Field(field) => self.link_type(package, target, &field.type_name),
                ExtendElement::Group(group) => self.link_group(package, target, group),
            }
        }
    }

    fn link_service(&mut self, package: &str, service: &Service) {
        for method in service.methods() {
            let key = NodeKey::new(package, format!("{}.{}", service.name, method.name));
            let id = self.graph.declare(key, NodeKind::Rpc);
            let keep = self.filter.matches_any(&method.options);
            self.graph.set_keep(id, keep);
            trace!(rpc = %self.graph.node(id).key, keep, "Linked RPC");

            self.link_type(package, id, &method.input.type_name);
            self.link_type(package, id, &method.output.type_name);
        }
    }

    fn link_type(&mut self, package: &str, parent: NodeId, type_name: &str) {
        self.link_chain(package, Some(parent), type_name);
    }

    /// Resolves `type_name` and links `parent` to the outermost type and each
    /// type to the one nested in it. Returns the innermost node.
    fn link_chain(
        &mut self,
        package: &str,
        parent: Option<NodeId>,
        type_name: &str,
    ) -> Option<NodeId> {
        let resolved = resolve_type(&self.graph, package, type_name)?;
        let mut previous = parent;
        for name in &resolved.chain {
            let id = self
                .graph
                .reference(NodeKey::new(resolved.package.as_str(), name.as_str()));
            if let Some(from) = previous {
                self.graph.add_edge(from, id);
            }
            previous = Some(id);
        }
        previous
    }

    pub fn finish(self) -> UsageGraph {
        self.graph
    }
}

/// Runs both builder passes over `files` and propagates the keep flag
pub fn build_graph<'f, I>(files: I, filter: &OptionFilter, keep_packages: &[String]) -> UsageGraph
where
    I: IntoIterator<Item = &'f ProtoFile>,
    I::IntoIter: Clone,
{
    let files = files.into_iter();
    let mut builder = GraphBuilder::new(filter);
    for file in files.clone() {
        builder.declare(file);
    }
    for file in files {
        builder.link(file);
    }

    let mut graph = builder.finish();
    let kept = graph.propagate(keep_packages);
    debug!(nodes = graph.len(), kept, "Built usage graph");
    graph
}
