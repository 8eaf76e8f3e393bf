//! Order resolution for ranking neighbours.
//!
//! # Responsibility
//! - Derive one comparable order key per node per field from edge endpoints.
//! - Rank a node's out-edges of one field.
//!
//! # Invariants
//! - Numeric keys sort before `last`/absent keys.
//! - Ties are broken by target path, so rankings are deterministic.

use crate::graph::{Edge, EdgeOrder, Graph};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Comparable order key. `None` ranks after every number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderKey(pub Option<f64>);

impl OrderKey {
    pub const LAST: OrderKey = OrderKey(None);

    pub fn value(self) -> Option<f64> {
        self.0
    }
}

impl From<Option<EdgeOrder>> for OrderKey {
    fn from(order: Option<EdgeOrder>) -> Self {
        match order {
            Some(EdgeOrder::Value(value)) if !value.is_nan() => OrderKey(Some(value)),
            _ => OrderKey::LAST,
        }
    }
}

impl Eq for OrderKey {}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Order keys of every node, per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeOrders {
    keys: BTreeMap<String, BTreeMap<String, OrderKey>>,
}

impl NodeOrders {
    /// Collects the smallest key seen for each `(node, field)` pair.
    pub fn resolve(graph: &Graph) -> Self {
        let mut keys: BTreeMap<String, BTreeMap<String, OrderKey>> = BTreeMap::new();
        for edge in graph.edges() {
            for (node, order) in [
                (edge.source(), edge.attrs.source_order),
                (edge.target(), edge.attrs.target_order),
            ] {
                let key = OrderKey::from(order);
                keys.entry(node.to_string())
                    .or_default()
                    .entry(edge.field().to_string())
                    .and_modify(|current| *current = (*current).min(key))
                    .or_insert(key);
            }
        }
        Self { keys }
    }

    /// Key of `node` for `field`; `last` when the pair was never seen.
    pub fn key(&self, node: &str, field: &str) -> OrderKey {
        self.keys
            .get(node)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or(OrderKey::LAST)
    }

    /// Number of nodes with at least one key.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Out-edges of `source` for `field`, sorted by target order then target path.
pub fn ranked_targets<'g>(graph: &'g Graph, source: &'g str, field: &str) -> Vec<Edge<'g>> {
    let mut edges: Vec<Edge<'g>> = graph
        .out_edges(source)
        .filter(|edge| edge.field() == field)
        .collect();
    edges.sort_by(|a, b| {
        OrderKey::from(a.attrs.target_order)
            .cmp(&OrderKey::from(b.attrs.target_order))
            .then_with(|| a.target().cmp(b.target()))
    });
    edges
}
