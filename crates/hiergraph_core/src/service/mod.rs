//! Graph build services.
//!
//! # Responsibility
//! - Run the full data flow from host queries to an immutable snapshot.
//! - Hold the latest published snapshot and discard superseded builds.
//!
//! # See also
//! - `builders` for the explicit-edge stages.

pub mod build;
pub mod store;

pub use build::{build_graph, GraphSnapshot};
pub use store::{BuildTicket, GraphStore};
