//! Labeled multigraph store.
//!
//! # Responsibility
//! - Hold nodes keyed by path and edges keyed by their identity tuple.
//! - Provide idempotent insertion used by every builder and the closure pass.
//!
//! # Invariants
//! - Edge identity is `(source, target, field, hierarchy_index)`; at most one
//!   edge exists per identity.
//! - An edge's direction is always its field's configured direction.
//! - `resolved: true` is never downgraded to `false`.
//! - An explicit edge replaces an implied edge of the same identity; every
//!   other repeated insert is a no-op.

use crate::model::hierarchy::{Direction, HierarchyField};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Numeric stand-in used when the `last` sentinel must be compared as a number.
pub const LAST_ORDER_VALUE: f64 = 9999.0;

/// Which stage produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Field,
    FolderNote,
    DateNote,
    Implied,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::FolderNote => "folder_note",
            Self::DateNote => "date_note",
            Self::Implied => "implied",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order hint attached to an edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrder {
    /// Order read from document metadata.
    Value(f64),
    /// No ordering signal; ranks after every value.
    Last,
}

impl EdgeOrder {
    pub fn as_number(self) -> f64 {
        match self {
            Self::Value(value) => value,
            Self::Last => LAST_ORDER_VALUE,
        }
    }
}

/// Identity tuple of an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    pub field: String,
    pub hierarchy_index: usize,
}

impl EdgeKey {
    pub fn new(source: &str, target: &str, field: &HierarchyField) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            field: field.name.clone(),
            hierarchy_index: field.hierarchy_index,
        }
    }
}

/// Non-identity edge attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeAttrs {
    pub direction: Direction,
    pub explicit: bool,
    pub provenance: Provenance,
    pub source_order: Option<EdgeOrder>,
    pub target_order: Option<EdgeOrder>,
}

impl EdgeAttrs {
    /// Attributes for an edge of `field`; explicit unless `provenance` is implied.
    pub fn new(
        field: &HierarchyField,
        provenance: Provenance,
        source_order: Option<EdgeOrder>,
        target_order: Option<EdgeOrder>,
    ) -> Self {
        Self {
            direction: field.direction,
            explicit: provenance != Provenance::Implied,
            provenance,
            source_order,
            target_order,
        }
    }
}

/// Borrowed view of one stored edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge<'g> {
    #[serde(flatten)]
    pub key: &'g EdgeKey,
    #[serde(flatten)]
    pub attrs: &'g EdgeAttrs,
}

impl<'g> Edge<'g> {
    pub fn source(&self) -> &'g str {
        self.key.source.as_str()
    }

    pub fn target(&self) -> &'g str {
        self.key.target.as_str()
    }

    pub fn field(&self) -> &'g str {
        self.key.field.as_str()
    }
}

/// Node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeAttrs {
    /// `false` for virtual nodes that are referenced but do not exist.
    pub resolved: bool,
}

/// Result of one edge insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Inserted,
    /// Identity already present; nothing changed.
    Duplicate,
    /// An implied edge was replaced by an explicit one.
    Upgraded,
}

/// Directed, labeled multigraph over document paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<String, NodeAttrs>,
    edges: BTreeMap<EdgeKey, EdgeAttrs>,
    known_documents: BTreeSet<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph whose documents are known to exist.
    ///
    /// Every document becomes a resolved node; other paths referenced later
    /// become virtual nodes.
    pub fn with_documents<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut graph = Self::new();
        for path in paths {
            graph.known_documents.insert(path.to_string());
            graph.safe_add_node(path, true);
        }
        graph
    }

    /// Whether `path` is a document known to exist.
    pub fn is_known_document(&self, path: &str) -> bool {
        self.known_documents.contains(path)
    }

    /// Inserts a node or merges `resolved` into an existing one.
    pub fn safe_add_node(&mut self, path: &str, resolved: bool) {
        self.nodes
            .entry(path.to_string())
            .and_modify(|attrs| attrs.resolved |= resolved)
            .or_insert(NodeAttrs { resolved });
    }

    /// Inserts an edge keyed by its identity, creating missing endpoints.
    pub fn safe_add_directed_edge(
        &mut self,
        source: &str,
        target: &str,
        field: &HierarchyField,
        attrs: EdgeAttrs,
    ) -> EdgeInsert {
        for path in [source, target] {
            if !self.nodes.contains_key(path) {
                let resolved = self.is_known_document(path);
                self.safe_add_node(path, resolved);
            }
        }

        let key = EdgeKey::new(source, target, field);
        match self.edges.get_mut(&key) {
            Some(existing) if !existing.explicit && attrs.explicit => {
                *existing = attrs;
                EdgeInsert::Upgraded
            }
            Some(_) => EdgeInsert::Duplicate,
            None => {
                self.edges.insert(key, attrs);
                EdgeInsert::Inserted
            }
        }
    }

    pub fn node(&self, path: &str) -> Option<&NodeAttrs> {
        self.nodes.get(path)
    }

    pub fn has_node(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Nodes in path order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttrs)> {
        self.nodes.iter().map(|(path, attrs)| (path.as_str(), attrs))
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<Edge<'_>> {
        self.edges
            .get_key_value(key)
            .map(|(key, attrs)| Edge { key, attrs })
    }

    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Edges in identity order.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> {
        self.edges.iter().map(|(key, attrs)| Edge { key, attrs })
    }

    /// Edges leaving `source`.
    pub fn out_edges<'g>(&'g self, source: &'g str) -> impl Iterator<Item = Edge<'g>> + 'g {
        let lower = EdgeKey {
            source: source.to_string(),
            target: String::new(),
            field: String::new(),
            hierarchy_index: 0,
        };
        self.edges
            .range(lower..)
            .take_while(move |(key, _)| key.source == source)
            .map(|(key, attrs)| Edge { key, attrs })
    }

    /// Edges entering `target`.
    pub fn in_edges<'g>(&'g self, target: &'g str) -> impl Iterator<Item = Edge<'g>> + 'g {
        self.edges().filter(move |edge| edge.key.target == target)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn explicit_edge_count(&self) -> usize {
        self.edges.values().filter(|attrs| attrs.explicit).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeAttrs, EdgeInsert, EdgeKey, EdgeOrder, Graph, Provenance};
    use crate::model::hierarchy::{Direction, HierarchyField};

    fn field(name: &str, direction: Direction) -> HierarchyField {
        HierarchyField {
            name: name.to_string(),
            hierarchy_index: 0,
            direction,
        }
    }

    fn explicit(field: &HierarchyField) -> EdgeAttrs {
        EdgeAttrs::new(field, Provenance::Field, None, None)
    }

    #[test]
    fn inserting_same_identity_twice_keeps_one_edge() {
        let up = field("up", Direction::Up);
        let mut graph = Graph::with_documents(["a.md", "b.md"]);

        assert_eq!(
            graph.safe_add_directed_edge("a.md", "b.md", &up, explicit(&up)),
            EdgeInsert::Inserted
        );
        assert_eq!(
            graph.safe_add_directed_edge("a.md", "b.md", &up, explicit(&up)),
            EdgeInsert::Duplicate
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn same_pair_may_carry_different_fields() {
        let up = field("up", Direction::Up);
        let same = field("same", Direction::Same);
        let mut graph = Graph::with_documents(["a.md", "b.md"]);

        graph.safe_add_directed_edge("a.md", "b.md", &up, explicit(&up));
        graph.safe_add_directed_edge("a.md", "b.md", &same, explicit(&same));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.out_edges("a.md").count(), 2);
        assert_eq!(graph.in_edges("b.md").count(), 2);
        assert_eq!(graph.out_edges("b.md").count(), 0);
    }

    #[test]
    fn out_edges_stop_at_neighbouring_sources() {
        let down = field("down", Direction::Down);
        let mut graph = Graph::with_documents(["a", "a.md", "a.md/x", "b.md"]);
        graph.safe_add_directed_edge("a", "a.md", &down, explicit(&down));
        graph.safe_add_directed_edge("a.md", "b.md", &down, explicit(&down));
        graph.safe_add_directed_edge("a.md", "a", &down, explicit(&down));
        graph.safe_add_directed_edge("a.md/x", "a.md", &down, explicit(&down));
        graph.safe_add_directed_edge("b.md", "a.md", &down, explicit(&down));

        let targets: Vec<&str> = graph.out_edges("a.md").map(|edge| edge.target()).collect();
        assert_eq!(targets, vec!["a", "b.md"]);
        assert_eq!(graph.out_edges("a.md/x").count(), 1);
        assert_eq!(graph.out_edges("missing.md").count(), 0);
        assert_eq!(graph.in_edges("a.md").count(), 3);
    }

    #[test]
    fn unknown_endpoints_become_virtual_nodes() {
        let down = field("down", Direction::Down);
        let mut graph = Graph::with_documents(["a.md"]);
        graph.safe_add_directed_edge("a.md", "ghost.md", &down, explicit(&down));

        assert!(graph.node("a.md").expect("source node").resolved);
        assert!(!graph.node("ghost.md").expect("virtual node").resolved);
    }

    #[test]
    fn resolved_flag_is_never_downgraded() {
        let mut graph = Graph::new();
        graph.safe_add_node("a.md", true);
        graph.safe_add_node("a.md", false);
        assert!(graph.node("a.md").expect("node").resolved);

        graph.safe_add_node("b.md", false);
        graph.safe_add_node("b.md", true);
        assert!(graph.node("b.md").expect("node").resolved);
    }

    #[test]
    fn explicit_replaces_implied_but_not_the_reverse() {
        let down = field("down", Direction::Down);
        let mut graph = Graph::with_documents(["a.md", "b.md"]);
        let implied = EdgeAttrs::new(&down, Provenance::Implied, None, None);

        graph.safe_add_directed_edge("a.md", "b.md", &down, implied.clone());
        assert_eq!(
            graph.safe_add_directed_edge("a.md", "b.md", &down, explicit(&down)),
            EdgeInsert::Upgraded
        );
        assert_eq!(
            graph.safe_add_directed_edge("a.md", "b.md", &down, implied),
            EdgeInsert::Duplicate
        );

        let key = EdgeKey::new("a.md", "b.md", &down);
        let edge = graph.edge(&key).expect("stored edge");
        assert!(edge.attrs.explicit);
        assert_eq!(edge.attrs.provenance, Provenance::Field);
    }

    #[test]
    fn edge_direction_follows_field() {
        let next = field("next", Direction::Next);
        let attrs = EdgeAttrs::new(&next, Provenance::DateNote, Some(EdgeOrder::Last), None);
        assert_eq!(attrs.direction, Direction::Next);
        assert!(attrs.explicit);
        assert_eq!(EdgeOrder::Last.as_number(), 9999.0);
    }
}
