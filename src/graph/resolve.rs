use super::UsageGraph;

const SCALAR_TYPES: &[&str] = &[
    "bool", "string", "bytes", "float", "double", "int32", "int64", "uint32", "uint64", "sint32",
    "sint64", "fixed32", "fixed64", "sfixed32", "sfixed64",
];

pub fn is_scalar_type(type_name: &str) -> bool {
    SCALAR_TYPES.contains(&type_name)
}

/// A type reference resolved to a package and a chain of nested type names
///
/// `outer.pkg.Outer.Inner` resolves to package `outer.pkg` with chain
/// `[Outer, Inner]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub package: String,
    pub chain: Vec<String>,
}

/// Resolves a type reference written inside `current_package`
///
/// Segments starting with a lowercase letter are package components, the first
/// uppercase segment starts the type chain. Relative references are looked up
/// in the current package and then each enclosing package; the first scope
/// that declares the outermost type wins. Returns `None` for scalar types.
pub fn resolve_type(
    graph: &UsageGraph,
    current_package: &str,
    type_name: &str,
) -> Option<ResolvedType> {
    if is_scalar_type(type_name) {
        return None;
    }

    let fully_qualified = type_name.starts_with('.');
    let segments: Vec<&str> = type_name.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }

    let split = segments
        .iter()
        .position(|s| s.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(segments.len() - 1);
    let package_part = segments[..split].join(".");
    let chain: Vec<String> = segments[split..].iter().map(|s| s.to_string()).collect();

    if fully_qualified {
        return Some(ResolvedType {
            package: package_part,
            chain,
        });
    }

    let package = enclosing_scopes(current_package)
        .map(|scope| join_package(scope, &package_part))
        .find(|candidate| graph.is_declared(candidate, &chain[0]))
        .unwrap_or_else(|| {
            if package_part.is_empty() {
                current_package.to_string()
            } else {
                package_part.clone()
            }
        });

    Some(ResolvedType { package, chain })
}

/// `a.b.c` yields `a.b.c`, `a.b`, `a`, then the root scope
fn enclosing_scopes(package: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(package);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rfind('.').map_or("", |i| &current[..i]))
        };
        Some(current)
    })
}

fn join_package(scope: &str, relative: &str) -> String {
    match (scope.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => scope.to_string(),
        (false, false) => format!("{}.{}", scope, relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKey, NodeKind};
    use yare::parameterized;

    fn resolved(package: &str, chain: &[&str]) -> Option<ResolvedType> {
        Some(ResolvedType {
            package: package.to_string(),
            chain: chain.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[parameterized(
        string = { "string" },
        bytes = { "bytes" },
        sfixed64 = { "sfixed64" },
    )]
    fn test_scalars_do_not_resolve(type_name: &str) {
        assert_eq!(resolve_type(&UsageGraph::new(), "acme", type_name), None);
    }

    #[test]
    fn test_enclosing_scopes() {
        let scopes: Vec<&str> = enclosing_scopes("a.b.c").collect();
        assert_eq!(scopes, vec!["a.b.c", "a.b", "a", ""]);
        let root: Vec<&str> = enclosing_scopes("").collect();
        assert_eq!(root, vec![""]);
    }

    #[test]
    fn test_unqualified_name_defaults_to_current_package() {
        let graph = UsageGraph::new();
        assert_eq!(
            resolve_type(&graph, "acme.v1", "Account"),
            resolved("acme.v1", &["Account"])
        );
    }

    #[test]
    fn test_unqualified_name_found_in_parent_package() {
        let mut graph = UsageGraph::new();
        graph.declare(NodeKey::new("acme", "Money"), NodeKind::Message);
        assert_eq!(
            resolve_type(&graph, "acme.v1", "Money"),
            resolved("acme", &["Money"])
        );
    }

    #[test]
    fn test_current_package_shadows_parent() {
        let mut graph = UsageGraph::new();
        graph.declare(NodeKey::new("acme", "Money"), NodeKind::Message);
        graph.declare(NodeKey::new("acme.v1", "Money"), NodeKind::Message);
        assert_eq!(
            resolve_type(&graph, "acme.v1", "Money"),
            resolved("acme.v1", &["Money"])
        );
    }

    #[test]
    fn test_partially_qualified_name_resolved_against_scopes() {
        let mut graph = UsageGraph::new();
        graph.declare(NodeKey::new("acme.common", "Money"), NodeKind::Message);
        assert_eq!(
            resolve_type(&graph, "acme.billing", "common.Money"),
            resolved("acme.common", &["Money"])
        );
    }

    #[test]
    fn test_qualified_name_falls_back_to_literal_package() {
        assert_eq!(
            resolve_type(&UsageGraph::new(), "acme", "google.protobuf.Timestamp"),
            resolved("google.protobuf", &["Timestamp"])
        );
    }

    #[test]
    fn test_fully_qualified_name_is_taken_literally() {
        let mut graph = UsageGraph::new();
        graph.declare(NodeKey::new("acme.other", "Thing"), NodeKind::Message);
        assert_eq!(
            resolve_type(&graph, "acme", ".other.Thing"),
            resolved("other", &["Thing"])
        );
    }

    #[test]
    fn test_nested_reference_yields_chain() {
        assert_eq!(
            resolve_type(&UsageGraph::new(), "acme", "Outer.Inner"),
            resolved("acme", &["Outer", "Inner"])
        );
        assert_eq!(
            resolve_type(&UsageGraph::new(), "x", ".acme.Outer.Inner"),
            resolved("acme", &["Outer", "Inner"])
        );
    }

    #[test]
    fn test_all_lowercase_name_uses_last_segment_as_type() {
        assert_eq!(
            resolve_type(&UsageGraph::new(), "acme", "other.thing"),
            resolved("other", &["thing"])
        );
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        assert_eq!(resolve_type(&UsageGraph::new(), "acme", "."), None);
    }
}
