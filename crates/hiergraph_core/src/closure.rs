//! Implied-edge closure.
//!
//! # Responsibility
//! - Add the reciprocal of every explicit edge whose field has one.
//! - Optionally imply siblings between children of a shared explicit parent.
//!
//! # Invariants
//! - Runs once, over a snapshot of explicit edges taken before any insertion;
//!   implied edges never produce further implied edges.
//! - Implied edges never replace an existing edge of the same identity.
//! - Reciprocal edges swap `source_order` and `target_order`.

use crate::config::ImpliedSettings;
use crate::graph::{EdgeAttrs, EdgeInsert, EdgeKey, EdgeOrder, Graph, Provenance};
use crate::model::hierarchy::{Direction, FieldTable};
use log::debug;
use std::collections::BTreeMap;

/// Counts of implied edges added by one closure pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureStats {
    pub reciprocal: usize,
    pub siblings: usize,
}

impl ClosureStats {
    pub fn total(&self) -> usize {
        self.reciprocal + self.siblings
    }
}

/// Adds implied edges derived from the explicit edges currently in `graph`.
pub fn close_implied(
    graph: &mut Graph,
    table: &FieldTable,
    settings: &ImpliedSettings,
) -> ClosureStats {
    let explicit: Vec<(EdgeKey, EdgeAttrs)> = graph
        .edges()
        .filter(|edge| edge.attrs.explicit)
        .map(|edge| (edge.key.clone(), edge.attrs.clone()))
        .collect();

    let mut stats = ClosureStats::default();
    for (key, attrs) in &explicit {
        let Some(reciprocal) = table.reciprocal_of(key.field.as_str()) else {
            continue;
        };
        let implied = EdgeAttrs::new(
            reciprocal,
            Provenance::Implied,
            attrs.target_order,
            attrs.source_order,
        );
        let outcome = graph.safe_add_directed_edge(
            key.target.as_str(),
            key.source.as_str(),
            reciprocal,
            implied,
        );
        if outcome == EdgeInsert::Inserted {
            stats.reciprocal += 1;
        }
    }

    if settings.siblings_from_parent {
        stats.siblings = imply_siblings(graph, table, &explicit);
    }

    debug!(
        "event=closure_done module=closure status=ok explicit={} reciprocal={} siblings={}",
        explicit.len(),
        stats.reciprocal,
        stats.siblings
    );
    stats
}

/// Children share a parent when they point `up` to it or it points `down` to them.
fn imply_siblings(
    graph: &mut Graph,
    table: &FieldTable,
    explicit: &[(EdgeKey, EdgeAttrs)],
) -> usize {
    let mut children: BTreeMap<(usize, &str), BTreeMap<&str, Option<EdgeOrder>>> =
        BTreeMap::new();
    for (key, attrs) in explicit {
        let (parent, child, order) = match attrs.direction {
            Direction::Up => (key.target.as_str(), key.source.as_str(), attrs.source_order),
            Direction::Down => (key.source.as_str(), key.target.as_str(), attrs.target_order),
            _ => continue,
        };
        let slot = children
            .entry((key.hierarchy_index, parent))
            .or_default()
            .entry(child)
            .or_insert(order);
        if slot.is_none() {
            *slot = order;
        }
    }

    let mut added = 0;
    for ((hierarchy_index, _), members) in &children {
        if !table.implies(*hierarchy_index) {
            continue;
        }
        let Some(same) = table.field_in(*hierarchy_index, Direction::Same) else {
            continue;
        };
        for (a, a_order) in members {
            for (b, b_order) in members {
                if a == b {
                    continue;
                }
                let attrs = EdgeAttrs::new(same, Provenance::Implied, *a_order, *b_order);
                if graph.safe_add_directed_edge(a, b, same, attrs) == EdgeInsert::Inserted {
                    added += 1;
                }
            }
        }
    }
    added
}
