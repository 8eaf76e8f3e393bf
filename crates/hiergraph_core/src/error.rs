//! Non-fatal build error reporting.
//!
//! # Responsibility
//! - Define the `{code, message, path}` record surfaced to callers after a build.
//! - Accumulate errors from every builder without aborting the build.
//!
//! # Invariants
//! - Collecting an error never stops the current build.
//! - Errors keep insertion order so callers can display them as reported.

use log::warn;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable error codes for build-time problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildErrorCode {
    /// A configured field or value does not resolve against the field table.
    InvalidSettingValue,
    /// Per-document metadata or content could not be read from the host.
    MetadataReadFailure,
}

impl BuildErrorCode {
    /// Stable string id used in log lines and serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSettingValue => "invalid_setting_value",
            Self::MetadataReadFailure => "metadata_read_failure",
        }
    }
}

impl Display for BuildErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One non-fatal problem found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildError {
    pub code: BuildErrorCode,
    pub message: String,
    /// Document path or settings path the problem is attached to.
    pub path: String,
}

impl BuildError {
    pub fn new(code: BuildErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Shorthand for `invalid_setting_value`.
    pub fn invalid_setting(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(BuildErrorCode::InvalidSettingValue, message, path)
    }

    /// Shorthand for `metadata_read_failure`.
    pub fn metadata_read(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(BuildErrorCode::MetadataReadFailure, message, path)
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.code, self.message, self.path)
    }
}

impl Error for BuildError {}

/// Error accumulator threaded through one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildErrors {
    entries: Vec<BuildError>,
}

impl BuildErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one error and logs it at `warn` level.
    pub fn push(&mut self, error: BuildError) {
        warn!(
            "event=build_error module=graph status=error code={} path={} message={}",
            error.code, error.path, error.message
        );
        self.entries.push(error);
    }

    /// Moves all errors from `other` into this collector.
    ///
    /// Entries were already logged when first pushed.
    pub fn extend(&mut self, other: BuildErrors) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildError> {
        self.entries.iter()
    }

    /// Returns errors carrying `code`.
    pub fn with_code(&self, code: BuildErrorCode) -> Vec<&BuildError> {
        self.entries.iter().filter(|err| err.code == code).collect()
    }

    pub fn into_vec(self) -> Vec<BuildError> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, BuildErrorCode, BuildErrors};

    #[test]
    fn keeps_insertion_order_and_filters_by_code() {
        let mut errors = BuildErrors::new();
        errors.push(BuildError::invalid_setting("bad field", "settings.a"));
        errors.push(BuildError::metadata_read("unreadable", "notes/a.md"));
        errors.push(BuildError::invalid_setting("bad value", "notes/b.md"));

        assert_eq!(errors.len(), 3);
        let paths: Vec<_> = errors.iter().map(|err| err.path.as_str()).collect();
        assert_eq!(paths, vec!["settings.a", "notes/a.md", "notes/b.md"]);
        assert_eq!(
            errors.with_code(BuildErrorCode::InvalidSettingValue).len(),
            2
        );
    }

    #[test]
    fn display_includes_code_and_path() {
        let err = BuildError::metadata_read("boom", "x.md");
        assert_eq!(err.to_string(), "[metadata_read_failure] boom (x.md)");
    }
}
