//! Explicit-edge builders.
//!
//! # Responsibility
//! - Turn normalized records, folder structure and dated basenames into edge
//!   candidates.
//! - Apply candidates to the graph through idempotent insertion.
//!
//! # Invariants
//! - The builder set is closed: field, folder-note, date-note, run in that order.
//! - Builders never touch the graph directly; they return candidates and errors.
//! - Folder-note and date-note builders never emit self-loops.

use crate::config::Settings;
use crate::error::BuildErrors;
use crate::graph::{EdgeAttrs, EdgeInsert, EdgeOrder, Graph, Provenance};
use crate::host::WorkspaceHost;
use crate::model::document::DocumentRecord;
use crate::model::hierarchy::FieldTable;
use log::debug;
use std::collections::BTreeMap;

pub mod date_note;
pub mod field;
pub mod folder_note;

/// Shared read-only inputs for one builder run.
pub struct BuildContext<'a> {
    pub host: &'a dyn WorkspaceHost,
    pub records: &'a [DocumentRecord],
    pub field_table: &'a FieldTable,
    pub settings: &'a Settings,
    by_path: BTreeMap<&'a str, &'a DocumentRecord>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        host: &'a dyn WorkspaceHost,
        records: &'a [DocumentRecord],
        field_table: &'a FieldTable,
        settings: &'a Settings,
    ) -> Self {
        let by_path = records
            .iter()
            .map(|record| (record.path.as_str(), record))
            .collect();
        Self {
            host,
            records,
            field_table,
            settings,
            by_path,
        }
    }

    /// Looks up the record of one document path.
    pub fn record(&self, path: &str) -> Option<&'a DocumentRecord> {
        self.by_path.get(path).copied()
    }

    /// Metadata order of one document, read from the configured order field.
    pub fn order_of(&self, path: &str) -> Option<EdgeOrder> {
        self.record(path)
            .and_then(|record| record.order(self.settings.order_field.as_str()))
            .map(EdgeOrder::Value)
    }
}

/// One edge proposed by a builder.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCandidate {
    pub source: String,
    pub target: String,
    pub field: String,
    pub provenance: Provenance,
    pub source_order: Option<EdgeOrder>,
    pub target_order: Option<EdgeOrder>,
}

/// Edges and errors produced by one builder run.
#[derive(Debug, Clone, Default)]
pub struct BuilderOutput {
    pub edges: Vec<EdgeCandidate>,
    pub errors: BuildErrors,
}

impl BuilderOutput {
    /// Inserts every candidate into `graph`; returns the number of new edges.
    pub fn apply(&self, graph: &mut Graph, field_table: &FieldTable) -> usize {
        let mut inserted = 0;
        for candidate in &self.edges {
            let Some(field) = field_table.get(candidate.field.as_str()) else {
                debug!(
                    "event=edge_skipped module=builders status=ok reason=unknown_field field={}",
                    candidate.field
                );
                continue;
            };
            let attrs = EdgeAttrs::new(
                field,
                candidate.provenance,
                candidate.source_order,
                candidate.target_order,
            );
            let outcome = graph.safe_add_directed_edge(
                candidate.source.as_str(),
                candidate.target.as_str(),
                field,
                attrs,
            );
            if outcome == EdgeInsert::Inserted {
                inserted += 1;
            }
        }
        inserted
    }
}

/// Closed set of explicit-edge builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitBuilder {
    Field,
    FolderNote,
    DateNote,
}

impl ExplicitBuilder {
    /// Builders in execution order.
    pub const ORDERED: [ExplicitBuilder; 3] = [
        ExplicitBuilder::Field,
        ExplicitBuilder::FolderNote,
        ExplicitBuilder::DateNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::FolderNote => "folder_note",
            Self::DateNote => "date_note",
        }
    }

    pub fn is_enabled(self, settings: &Settings) -> bool {
        match self {
            Self::Field => settings.builders.field.enabled,
            Self::FolderNote => settings.folder_note.enabled,
            Self::DateNote => {
                let date_note = &settings.date_note;
                date_note.enabled
                    && date_note
                        .default_field
                        .as_deref()
                        .is_some_and(|field| !field.trim().is_empty())
                    && !date_note.date_format.trim().is_empty()
            }
        }
    }

    pub fn build(self, ctx: &BuildContext<'_>) -> BuilderOutput {
        match self {
            Self::Field => field::build(ctx),
            Self::FolderNote => folder_note::build(ctx),
            Self::DateNote => date_note::build(ctx),
        }
    }
}
