//! Host workspace collaborator contracts.
//!
//! # Responsibility
//! - Define the read-only queries the build needs from the hosting workspace.
//! - Keep the graph build independent of any live file tree or metadata cache.
//!
//! # Invariants
//! - Every query is side-effect free from the build's point of view.
//! - `documents()` order is stable for one workspace state.

use crate::config::MetadataBackend;
use crate::model::document::{DocumentEntry, FieldMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;

pub use memory::{InMemoryWorkspace, SnapshotDocument, WorkspaceSnapshot};

/// Result type for host queries that may fail.
pub type HostResult<T> = Result<T, HostError>;

/// Errors reported by the host while serving a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Document metadata or content exists but cannot be read.
    Unreadable { path: String, message: String },
    /// Requested document is not part of the workspace.
    NotFound(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { path, message } => write!(f, "cannot read `{path}`: {message}"),
            Self::NotFound(path) => write!(f, "document not found: {path}"),
        }
    }
}

impl Error for HostError {}

/// Direct subfolder of a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FolderEntry {
    pub path: String,
    pub name: String,
}

/// Direct children of one folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub documents: Vec<DocumentEntry>,
    pub subfolders: Vec<FolderEntry>,
}

/// Query interface onto the hosting workspace.
pub trait WorkspaceHost {
    /// Enumerates every document in the workspace.
    fn documents(&self) -> Vec<DocumentEntry>;
    /// Reads structured metadata for one document from the chosen backend.
    ///
    /// `Ok(None)` means the document has no metadata.
    fn read_metadata(&self, backend: MetadataBackend, path: &str) -> HostResult<Option<FieldMap>>;
    /// Resolves link text relative to `context_path` to a document path.
    fn resolve_link(&self, link_text: &str, context_path: &str) -> Option<String>;
    /// Whether a document exists at exactly `path`.
    fn document_exists(&self, path: &str) -> bool;
    /// Lists direct documents and subfolders of `folder` (`""` is the root).
    fn list_folder(&self, folder: &str) -> Option<FolderListing>;
    /// Reads the full text content of one document.
    fn read_content(&self, path: &str) -> HostResult<String>;
}
