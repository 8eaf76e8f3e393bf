//! Build settings.
//!
//! # Responsibility
//! - Describe every option the graph build recognizes.
//! - Load settings from JSON with defaults for omitted keys.
//!
//! # Invariants
//! - A settings document with no keys is valid and yields `Settings::default()`.
//! - Unknown keys are rejected so typos surface instead of being ignored.

use crate::model::hierarchy::Direction;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_ORDER_FIELD: &str = "order";
pub const DEFAULT_FOLDER_NOTE_KEY: &str = "BC-folder-note";
pub const DEFAULT_FOLDER_NOTE_RECURSIVE_KEY: &str = "BC-folder-note-recursive";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from loading settings.
#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Settings text is not valid JSON for the settings schema.
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read settings `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid settings: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Which host index supplies per-document metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataBackend {
    /// Raw frontmatter from the host's own metadata cache.
    #[default]
    Frontmatter,
    /// Page records from a query-index plugin; link values arrive as structs.
    PageIndex,
}

impl MetadataBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frontmatter => "frontmatter",
            Self::PageIndex => "page_index",
        }
    }
}

/// One user hierarchy: at most one field name per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HierarchyConfig {
    pub up: Option<String>,
    pub same: Option<String>,
    pub down: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
    /// Whether reciprocal edges are implied for this hierarchy.
    pub implied: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            up: None,
            same: None,
            down: None,
            next: None,
            prev: None,
            implied: true,
        }
    }
}

impl HierarchyConfig {
    /// The classic `up/same/down/next/prev` hierarchy.
    pub fn standard() -> Self {
        Self {
            up: Some("up".to_string()),
            same: Some("same".to_string()),
            down: Some("down".to_string()),
            next: Some("next".to_string()),
            prev: Some("prev".to_string()),
            implied: true,
        }
    }

    /// Returns the configured field name for `direction`, ignoring blanks.
    pub fn field_for(&self, direction: Direction) -> Option<&str> {
        let value = match direction {
            Direction::Up => &self.up,
            Direction::Same => &self.same,
            Direction::Down => &self.down,
            Direction::Next => &self.next,
            Direction::Prev => &self.prev,
        };
        value
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldBuilderSettings {
    pub enabled: bool,
}

impl Default for FieldBuilderSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolderNoteSettings {
    pub enabled: bool,
    /// Metadata key whose value names the field a folder note links with.
    pub key: String,
    /// Per-document metadata key that turns on recursion for that note.
    pub recursive_key: String,
    /// Recurse into subfolders for every folder note.
    pub recursive: bool,
}

impl Default for FolderNoteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            key: DEFAULT_FOLDER_NOTE_KEY.to_string(),
            recursive_key: DEFAULT_FOLDER_NOTE_RECURSIVE_KEY.to_string(),
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateNoteSettings {
    pub enabled: bool,
    pub default_field: Option<String>,
    /// `chrono` strftime pattern matched against whole basenames.
    pub date_format: String,
    /// Link to the next existing dated note instead of the next calendar day.
    pub stretch_to_existing: bool,
}

impl Default for DateNoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default_field: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            stretch_to_existing: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderSettings {
    pub field: FieldBuilderSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpliedSettings {
    /// Children sharing an explicit parent become implied siblings.
    pub siblings_from_parent: bool,
}

/// Full settings consumed by one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub hierarchies: Vec<HierarchyConfig>,
    pub metadata_backend: MetadataBackend,
    /// Metadata key holding a document's numeric order.
    pub order_field: String,
    pub builders: BuilderSettings,
    pub folder_note: FolderNoteSettings,
    pub date_note: DateNoteSettings,
    pub implied: ImpliedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hierarchies: vec![HierarchyConfig::standard()],
            metadata_backend: MetadataBackend::default(),
            order_field: DEFAULT_ORDER_FIELD.to_string(),
            builders: BuilderSettings::default(),
            folder_note: FolderNoteSettings::default(),
            date_note: DateNoteSettings::default(),
            implied: ImpliedSettings::default(),
        }
    }
}

impl Settings {
    /// Parses settings from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(text.as_str())
    }
}
