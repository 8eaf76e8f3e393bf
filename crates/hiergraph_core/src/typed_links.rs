//! Typed-link extraction from document text.
//!
//! A typed link is a list item whose first word names a hierarchy field,
//! followed by wiki links: `- up [[Parent]] [[Other|alias]]`.

use crate::error::{BuildError, BuildErrors};
use crate::host::WorkspaceHost;
use crate::metadata::split_links;
use crate::model::document::DocumentRecord;
use crate::model::hierarchy::FieldTable;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

static TYPED_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*+]\s+([^\s\[]+)\s+(\[\[.*)$").expect("valid typed link regex")
});

/// Links of one type found on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedLinkLine {
    pub link_type: String,
    pub targets: Vec<String>,
}

/// Parses one line; `None` unless it is a list item typed with a known field.
pub fn extract_typed_link(line: &str, fields: &FieldTable) -> Option<TypedLinkLine> {
    let caps = TYPED_LINK_RE.captures(line)?;
    let link_type = caps.get(1)?.as_str();
    if !fields.contains(link_type) {
        return None;
    }
    let targets = split_links(caps.get(2)?.as_str());
    if targets.is_empty() {
        return None;
    }
    Some(TypedLinkLine {
        link_type: link_type.to_string(),
        targets,
    })
}

/// Typed links of every record, keyed by document path.
///
/// Documents without typed links are omitted; unreadable content is reported
/// and the document skipped.
pub fn collect_typed_links(
    host: &dyn WorkspaceHost,
    records: &[DocumentRecord],
    fields: &FieldTable,
    errors: &mut BuildErrors,
) -> BTreeMap<String, Vec<TypedLinkLine>> {
    let mut out = BTreeMap::new();
    for record in records {
        let content = match host.read_content(record.path.as_str()) {
            Ok(content) => content,
            Err(err) => {
                errors.push(BuildError::metadata_read(
                    format!("content unavailable: {err}"),
                    record.path.as_str(),
                ));
                continue;
            }
        };
        let lines: Vec<TypedLinkLine> = content
            .lines()
            .filter_map(|line| extract_typed_link(line, fields))
            .collect();
        if !lines.is_empty() {
            debug!(
                "event=typed_links_found module=typed_links status=ok path={} lines={}",
                record.path,
                lines.len()
            );
            out.insert(record.path.clone(), lines);
        }
    }
    out
}
