//! One complete graph build.
//!
//! # Invariants
//! - A build always completes; every problem lands in `GraphSnapshot::errors`.
//! - Builders run in their fixed order before the closure pass.
//! - Every enumerated document is a resolved node even without edges.

use crate::builders::{BuildContext, ExplicitBuilder};
use crate::closure::close_implied;
use crate::config::Settings;
use crate::error::{BuildError, BuildErrors};
use crate::graph::{Edge, Graph};
use crate::host::WorkspaceHost;
use crate::metadata::normalize_documents;
use crate::model::hierarchy::FieldTable;
use crate::order::{ranked_targets, NodeOrders};
use log::{debug, info};
use std::time::Instant;
use uuid::Uuid;

/// Immutable result of one build.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub build_id: Uuid,
    pub graph: Graph,
    pub field_table: FieldTable,
    pub orders: NodeOrders,
    pub errors: Vec<BuildError>,
}

impl GraphSnapshot {
    /// Out-edges of `source` for `field`, ranked by target order.
    pub fn ranked_targets<'g>(&'g self, source: &'g str, field: &str) -> Vec<Edge<'g>> {
        ranked_targets(&self.graph, source, field)
    }
}

/// Builds the relation graph of the workspace served by `host`.
pub fn build_graph(host: &dyn WorkspaceHost, settings: &Settings) -> GraphSnapshot {
    let build_id = Uuid::new_v4();
    let started_at = Instant::now();
    let mut errors = BuildErrors::new();

    let field_table = FieldTable::from_hierarchies(&settings.hierarchies, &mut errors);
    let records = normalize_documents(host, settings.metadata_backend, &mut errors);
    let mut graph = Graph::with_documents(records.iter().map(|record| record.path.as_str()));

    let ctx = BuildContext::new(host, &records, &field_table, settings);
    for builder in ExplicitBuilder::ORDERED {
        if !builder.is_enabled(settings) {
            debug!(
                "event=builder_skipped module=service build_id={build_id} builder={}",
                builder.as_str()
            );
            continue;
        }
        let output = builder.build(&ctx);
        let inserted = output.apply(&mut graph, &field_table);
        debug!(
            "event=builder_done module=service status=ok build_id={build_id} builder={} candidates={} inserted={} errors={}",
            builder.as_str(),
            output.edges.len(),
            inserted,
            output.errors.len()
        );
        errors.extend(output.errors);
    }

    let closure = close_implied(&mut graph, &field_table, &settings.implied);
    let orders = NodeOrders::resolve(&graph);

    info!(
        "event=graph_build module=service status=ok build_id={build_id} documents={} nodes={} edges={} implied={} errors={} duration_ms={}",
        records.len(),
        graph.node_count(),
        graph.edge_count(),
        closure.total(),
        errors.len(),
        started_at.elapsed().as_millis()
    );

    GraphSnapshot {
        build_id,
        graph,
        field_table,
        orders,
        errors: errors.into_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::build_graph;
    use crate::config::Settings;
    use crate::error::BuildErrorCode;
    use crate::host::InMemoryWorkspace;
    use serde_json::json;

    #[test]
    fn isolated_documents_are_resolved_nodes() {
        let ws = InMemoryWorkspace::new()
            .with_document("A.md", json!({}))
            .with_document("B.md", json!(null));

        let snapshot = build_graph(&ws, &Settings::default());
        assert_eq!(snapshot.graph.node_count(), 2);
        assert_eq!(snapshot.graph.edge_count(), 0);
        assert!(snapshot.graph.node("B.md").expect("node").resolved);
        assert!(snapshot.errors.is_empty());
    }

    #[test]
    fn disabled_field_builder_adds_nothing() {
        let ws = InMemoryWorkspace::new()
            .with_document("A.md", json!({ "up": "[[B]]" }))
            .with_document("B.md", json!({}));
        let mut settings = Settings::default();
        settings.builders.field.enabled = false;

        let snapshot = build_graph(&ws, &settings);
        assert_eq!(snapshot.graph.edge_count(), 0);
    }

    #[test]
    fn errors_from_every_stage_are_collected() {
        let ws = InMemoryWorkspace::new()
            .with_document("X/F.md", json!({ "BC-folder-note": "nowhere" }))
            .with_document("2024-01-01.md", json!({}));
        let mut settings = Settings::default();
        settings.date_note.enabled = true;
        settings.date_note.default_field = Some("tomorrow".to_string());

        let snapshot = build_graph(&ws, &settings);
        assert_eq!(snapshot.errors.len(), 2);
        assert!(snapshot
            .errors
            .iter()
            .all(|err| err.code == BuildErrorCode::InvalidSettingValue));
        assert_ne!(snapshot.build_id, build_graph(&ws, &settings).build_id);
    }
}
