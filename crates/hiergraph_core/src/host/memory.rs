//! In-memory workspace host.
//!
//! # Responsibility
//! - Serve every `WorkspaceHost` query from an owned document map.
//! - Load workspace snapshots from JSON for the CLI and tests.
//!
//! # Invariants
//! - Documents are enumerated in path order.
//! - Every ancestor folder of a document is listable.
//! - The page backend falls back to frontmatter when a document has no page
//!   record, since page indexes include frontmatter keys.

use crate::config::MetadataBackend;
use crate::host::{FolderEntry, FolderListing, HostError, HostResult, WorkspaceHost};
use crate::model::document::{field_map_from_json, DocumentEntry, FieldMap};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Serialized workspace shape accepted by `InMemoryWorkspace::from_json_str`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub documents: Vec<SnapshotDocument>,
    /// Extra folders that hold no documents.
    #[serde(default)]
    pub folders: Vec<String>,
}

/// One document inside a `WorkspaceSnapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotDocument {
    pub path: String,
    #[serde(default)]
    pub frontmatter: Option<serde_json::Value>,
    #[serde(default)]
    pub page: Option<serde_json::Value>,
    #[serde(default)]
    pub content: String,
    /// Simulates a document whose metadata cannot be read.
    #[serde(default)]
    pub unreadable: bool,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    entry: DocumentEntry,
    frontmatter: Option<FieldMap>,
    page: Option<FieldMap>,
    content: String,
    unreadable: bool,
}

/// `WorkspaceHost` backed by owned maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkspace {
    documents: BTreeMap<String, StoredDocument>,
    folders: BTreeSet<String>,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON workspace snapshot.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let snapshot: WorkspaceSnapshot = serde_json::from_str(text)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: WorkspaceSnapshot) -> Self {
        let mut workspace = Self::new();
        for folder in snapshot.folders {
            workspace.add_folder(folder.as_str());
        }
        for doc in snapshot.documents {
            workspace.insert(doc.path.as_str(), doc.frontmatter.map(field_map_from_json));
            if let Some(page) = doc.page {
                workspace.set_page(doc.path.as_str(), field_map_from_json(page));
            }
            workspace.set_content(doc.path.as_str(), doc.content);
            if doc.unreadable {
                workspace.mark_unreadable(doc.path.as_str());
            }
        }
        workspace
    }

    /// Inserts or replaces one document with optional frontmatter.
    pub fn insert(&mut self, path: &str, frontmatter: Option<FieldMap>) {
        let entry = DocumentEntry::from_path(path.trim_matches('/'));
        self.add_folder(entry.folder.as_str());
        self.documents.insert(
            entry.path.clone(),
            StoredDocument {
                entry,
                frontmatter,
                page: None,
                content: String::new(),
                unreadable: false,
            },
        );
    }

    /// Builder-style insert taking frontmatter as a JSON object.
    pub fn with_document(mut self, path: &str, frontmatter: serde_json::Value) -> Self {
        let fields = match frontmatter {
            serde_json::Value::Null => None,
            other => Some(field_map_from_json(other)),
        };
        self.insert(path, fields);
        self
    }

    /// Sets the page-index record of an existing document.
    pub fn set_page(&mut self, path: &str, page: FieldMap) {
        if let Some(doc) = self.documents.get_mut(path) {
            doc.page = Some(page);
        }
    }

    pub fn set_content(&mut self, path: &str, content: impl Into<String>) {
        if let Some(doc) = self.documents.get_mut(path) {
            doc.content = content.into();
        }
    }

    pub fn mark_unreadable(&mut self, path: &str) {
        if let Some(doc) = self.documents.get_mut(path) {
            doc.unreadable = true;
        }
    }

    /// Registers a folder and all of its ancestors.
    pub fn add_folder(&mut self, folder: &str) {
        let mut current = folder.trim_matches('/');
        while !current.is_empty() {
            if !self.folders.insert(current.to_string()) {
                break;
            }
            current = paths::folder_of(current);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn stored(&self, path: &str) -> HostResult<&StoredDocument> {
        let doc = self
            .documents
            .get(path)
            .ok_or_else(|| HostError::NotFound(path.to_string()))?;
        if doc.unreadable {
            return Err(HostError::Unreadable {
                path: path.to_string(),
                message: "document is marked unreadable".to_string(),
            });
        }
        Ok(doc)
    }
}

fn link_matches(path: &str, text: &str) -> bool {
    let with_ext = format!("{text}.md");
    path == text
        || path == with_ext
        || path.ends_with(format!("/{text}").as_str())
        || path.ends_with(format!("/{with_ext}").as_str())
}

impl WorkspaceHost for InMemoryWorkspace {
    fn documents(&self) -> Vec<DocumentEntry> {
        self.documents.values().map(|doc| doc.entry.clone()).collect()
    }

    fn read_metadata(&self, backend: MetadataBackend, path: &str) -> HostResult<Option<FieldMap>> {
        let doc = self.stored(path)?;
        let fields = match backend {
            MetadataBackend::Frontmatter => doc.frontmatter.clone(),
            MetadataBackend::PageIndex => doc.page.clone().or_else(|| doc.frontmatter.clone()),
        };
        Ok(fields)
    }

    fn resolve_link(&self, link_text: &str, context_path: &str) -> Option<String> {
        let text = link_text.trim().trim_start_matches('/');
        if text.is_empty() {
            return None;
        }
        if self.documents.contains_key(text) {
            return Some(text.to_string());
        }

        let context_folder = paths::folder_of(context_path);
        self.documents
            .keys()
            .filter(|path| link_matches(path, text))
            .min_by_key(|path| {
                (
                    paths::folder_of(path) != context_folder,
                    path.len(),
                    *path,
                )
            })
            .cloned()
    }

    fn document_exists(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    fn list_folder(&self, folder: &str) -> Option<FolderListing> {
        let folder = folder.trim_matches('/');
        if !folder.is_empty() && !self.folders.contains(folder) {
            return None;
        }

        let documents = self
            .documents
            .values()
            .filter(|doc| doc.entry.folder == folder)
            .map(|doc| doc.entry.clone())
            .collect();
        let subfolders = self
            .folders
            .iter()
            .filter(|candidate| paths::folder_of(candidate) == folder)
            .map(|path| FolderEntry {
                path: path.clone(),
                name: paths::last_segment(path).to_string(),
            })
            .collect();

        Some(FolderListing {
            documents,
            subfolders,
        })
    }

    fn read_content(&self, path: &str) -> HostResult<String> {
        self.stored(path).map(|doc| doc.content.clone())
    }
}
