//! Workspace-relative path helpers.
//!
//! # Responsibility
//! - Join and split `/`-separated workspace paths.
//! - Derive folder, basename and extension parts of document paths.
//!
//! # Invariants
//! - The workspace root folder is the empty string, never `/`.
//! - Returned paths never carry a leading or trailing `/`.

/// Joins a folder and a child name.
///
/// An empty folder means the workspace root.
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    let name = name.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        folder.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// Builds a document path from its folder, basename and extension.
pub fn build(folder: &str, basename: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        join(folder, basename)
    } else {
        join(folder, format!("{basename}.{extension}").as_str())
    }
}

/// Returns the containing folder of `path` (`""` for root-level paths).
pub fn folder_of(path: &str) -> &str {
    let path = path.trim_matches('/');
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Returns the final `/`-separated segment of `value`.
pub fn last_segment(value: &str) -> &str {
    let value = value.trim_end_matches('/');
    match value.rfind('/') {
        Some(idx) => &value[idx + 1..],
        None => value,
    }
}

/// Returns the file name of `path`, extension included.
pub fn file_name_of(path: &str) -> &str {
    last_segment(path)
}

/// Returns the extension of `path` without the dot (`""` when absent).
///
/// Dotfiles such as `.hidden` have no extension.
pub fn extension_of(path: &str) -> &str {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx + 1..],
    }
}

/// Returns `value` without its trailing extension.
pub fn strip_extension(value: &str) -> &str {
    let ext = extension_of(value);
    if ext.is_empty() {
        value
    } else {
        &value[..value.len() - ext.len() - 1]
    }
}

/// Returns the file name of `path` without its extension.
pub fn basename_of(path: &str) -> &str {
    strip_extension(file_name_of(path))
}

#[cfg(test)]
mod tests {
    use super::{basename_of, build, extension_of, folder_of, join, last_segment, strip_extension};

    #[test]
    fn join_treats_empty_folder_as_root() {
        assert_eq!(join("", "a.md"), "a.md");
        assert_eq!(join("notes", "a.md"), "notes/a.md");
        assert_eq!(join("notes/", "/a.md"), "notes/a.md");
    }

    #[test]
    fn build_appends_extension_only_when_present() {
        assert_eq!(build("daily", "2024-01-02", "md"), "daily/2024-01-02.md");
        assert_eq!(build("", "2024-01-02", ".md"), "2024-01-02.md");
        assert_eq!(build("x", "README", ""), "x/README");
    }

    #[test]
    fn splits_document_paths() {
        assert_eq!(folder_of("a/b/c.md"), "a/b");
        assert_eq!(folder_of("c.md"), "");
        assert_eq!(basename_of("a/b/c.md"), "c");
        assert_eq!(extension_of("a/b/c.md"), "md");
        assert_eq!(extension_of("a/.hidden"), "");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(last_segment("folder/sub/Note"), "Note");
    }
}
