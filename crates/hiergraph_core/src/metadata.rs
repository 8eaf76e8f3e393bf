//! Metadata normalization and link-value extraction.
//!
//! # Responsibility
//! - Turn host documents plus raw backend metadata into `DocumentRecord`s.
//! - Extract linked basenames from raw field values.
//!
//! # Invariants
//! - One record per enumerated document, in enumeration order.
//! - A metadata read failure yields an empty record and a collected error,
//!   never an aborted pass.
//! - Link extraction never fails; it returns what it could collect.

use crate::config::MetadataBackend;
use crate::error::{BuildError, BuildErrors};
use crate::host::WorkspaceHost;
use crate::model::document::{DocumentRecord, FieldMap, RawValue};
use crate::paths;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static WIKI_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.+?)\]\]").expect("valid wiki link regex"));

/// Nesting depth flattened when reading list values.
pub const MAX_FLATTEN_DEPTH: usize = 5;

/// Normalizes every host document into a record.
pub fn normalize_documents(
    host: &dyn WorkspaceHost,
    backend: MetadataBackend,
    errors: &mut BuildErrors,
) -> Vec<DocumentRecord> {
    host.documents()
        .into_iter()
        .map(|entry| {
            let fields = match host.read_metadata(backend, entry.path.as_str()) {
                Ok(Some(fields)) => fields,
                Ok(None) => {
                    debug!(
                        "event=metadata_missing module=metadata status=ok backend={} path={}",
                        backend.as_str(),
                        entry.path
                    );
                    FieldMap::new()
                }
                Err(err) => {
                    errors.push(BuildError::metadata_read(
                        format!("metadata unavailable from {}: {err}", backend.as_str()),
                        entry.path.as_str(),
                    ));
                    FieldMap::new()
                }
            };
            DocumentRecord::new(entry, fields)
        })
        .collect()
}

/// Strips `#heading` and `|alias` suffixes from link inner text.
pub fn drop_header_or_alias(inner: &str) -> &str {
    let end = inner.find(['#', '|']).unwrap_or(inner.len());
    inner[..end].trim()
}

/// Returns the inner targets of every `[[...]]` link in `text`.
///
/// Targets keep their folder prefix; heading and alias suffixes are removed.
pub fn split_links(text: &str) -> Vec<String> {
    WIKI_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| drop_header_or_alias(m.as_str()))
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts linked basenames from one raw field value.
pub fn extract_link_targets(value: &RawValue) -> Vec<String> {
    let mut flat = Vec::new();
    flatten(value, MAX_FLATTEN_DEPTH, &mut flat);

    let mut targets = Vec::new();
    for item in flat {
        match item {
            RawValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let links = split_links(text);
                if links.is_empty() {
                    push_segment(&mut targets, text);
                } else {
                    for link in links {
                        push_segment(&mut targets, link.as_str());
                    }
                }
            }
            RawValue::Link { path } => push_segment(&mut targets, path.as_str()),
            _ => {}
        }
    }
    targets
}

/// Extracts linked basenames of `field` on one record.
pub fn field_targets(record: &DocumentRecord, field: &str) -> Vec<String> {
    record
        .field(field)
        .map(extract_link_targets)
        .unwrap_or_default()
}

fn flatten<'a>(value: &'a RawValue, remaining: usize, out: &mut Vec<&'a RawValue>) {
    match value {
        RawValue::List(items) if remaining > 0 => {
            for item in items {
                flatten(item, remaining - 1, out);
            }
        }
        other => out.push(other),
    }
}

fn push_segment(targets: &mut Vec<String>, value: &str) {
    let segment = paths::last_segment(value.trim()).trim();
    if !segment.is_empty() {
        targets.push(segment.to_string());
    }
}
