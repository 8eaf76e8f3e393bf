//! Relation-graph engine for hierarchical document workspaces.
//! Builds one labeled multigraph per refresh from metadata fields, folder
//! notes and dated filenames, then closes it over reciprocal relations.

pub mod builders;
pub mod closure;
pub mod config;
pub mod error;
pub mod graph;
pub mod host;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod order;
pub mod paths;
pub mod service;
pub mod typed_links;

pub use closure::{close_implied, ClosureStats};
pub use config::{ConfigError, HierarchyConfig, MetadataBackend, Settings};
pub use error::{BuildError, BuildErrorCode, BuildErrors};
pub use graph::{Edge, EdgeAttrs, EdgeInsert, EdgeKey, EdgeOrder, Graph, NodeAttrs, Provenance};
pub use host::{HostError, HostResult, InMemoryWorkspace, WorkspaceHost};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::document::{DocumentEntry, DocumentRecord, FieldMap, RawValue};
pub use model::hierarchy::{Direction, FieldTable, HierarchyField};
pub use order::{ranked_targets, NodeOrders, OrderKey};
pub use service::{build_graph, BuildTicket, GraphSnapshot, GraphStore};
pub use typed_links::{collect_typed_links, extract_typed_link, TypedLinkLine};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
