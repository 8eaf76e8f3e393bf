//! Folder-note builder: a document standing in for its containing folder.
//!
//! A document whose folder-note key names a hierarchy field links to every
//! other document in its folder with that field. In recursive mode each
//! subfolder, visited breadth-first, becomes an implicit folder note chained
//! from the previously visited one; those edges carry the `last` order since
//! subfolders have no metadata to order by.

use crate::builders::{BuildContext, BuilderOutput, EdgeCandidate};
use crate::error::BuildError;
use crate::graph::{EdgeOrder, Provenance};
use crate::host::FolderEntry;
use crate::model::document::DocumentRecord;
use crate::model::hierarchy::HierarchyField;
use crate::paths;
use log::debug;
use std::collections::VecDeque;

pub(crate) fn build(ctx: &BuildContext<'_>) -> BuilderOutput {
    let mut output = BuilderOutput::default();
    let settings = &ctx.settings.folder_note;

    for record in ctx.records {
        let Some(value) = record.field(settings.key.as_str()) else {
            continue;
        };
        let field_name = value.as_text().map(str::trim).unwrap_or_default();
        let Some(field) = ctx.field_table.get(field_name) else {
            output.errors.push(BuildError::invalid_setting(
                format!(
                    "`{}` value is not a configured hierarchy field: {value:?}",
                    settings.key
                ),
                record.path.as_str(),
            ));
            continue;
        };

        link_folder_siblings(ctx, record, field, &mut output);

        let recursive = settings.recursive
            || record
                .field(settings.recursive_key.as_str())
                .is_some_and(|flag| flag.is_truthy());
        if recursive {
            link_subfolders(ctx, record, field, &mut output);
        }
    }

    output
}

fn link_folder_siblings(
    ctx: &BuildContext<'_>,
    folder_note: &DocumentRecord,
    field: &HierarchyField,
    output: &mut BuilderOutput,
) {
    let source_order = ctx.order_of(folder_note.path.as_str());
    for other in ctx
        .records
        .iter()
        .filter(|other| other.folder == folder_note.folder && other.path != folder_note.path)
    {
        output.edges.push(EdgeCandidate {
            source: folder_note.path.clone(),
            target: other.path.clone(),
            field: field.name.clone(),
            provenance: Provenance::FolderNote,
            source_order,
            target_order: ctx.order_of(other.path.as_str()),
        });
    }
}

fn link_subfolders(
    ctx: &BuildContext<'_>,
    folder_note: &DocumentRecord,
    field: &HierarchyField,
    output: &mut BuilderOutput,
) {
    let Some(top) = ctx.host.list_folder(folder_note.folder.as_str()) else {
        debug!(
            "event=folder_missing module=builders status=ok folder={} note={}",
            folder_note.folder, folder_note.path
        );
        return;
    };

    let mut queue: VecDeque<FolderEntry> = top.subfolders.into_iter().collect();
    let mut previous = folder_note.path.clone();
    while let Some(folder) = queue.pop_front() {
        let listing = ctx.host.list_folder(folder.path.as_str()).unwrap_or_default();
        let note = subfolder_note_path(ctx, &folder);

        push_last_ordered(output, previous.as_str(), note.as_str(), field);
        for doc in &listing.documents {
            if doc.path == note || doc.basename == folder.name {
                continue;
            }
            push_last_ordered(output, note.as_str(), doc.path.as_str(), field);
        }

        queue.extend(listing.subfolders);
        previous = note;
    }
}

/// Path of the implicit folder note for `folder`.
///
/// A document named after the folder, inside it or beside it, stands in for
/// it; otherwise `<folder path>.md` is used as a virtual node.
fn subfolder_note_path(ctx: &BuildContext<'_>, folder: &FolderEntry) -> String {
    let context = paths::join(folder.path.as_str(), folder.name.as_str());
    let parent = paths::folder_of(folder.path.as_str());
    ctx.host
        .resolve_link(folder.name.as_str(), context.as_str())
        .filter(|resolved| {
            let resolved_folder = paths::folder_of(resolved);
            resolved_folder == folder.path || resolved_folder == parent
        })
        .unwrap_or_else(|| format!("{}.md", folder.path))
}

fn push_last_ordered(
    output: &mut BuilderOutput,
    source: &str,
    target: &str,
    field: &HierarchyField,
) {
    if source == target {
        return;
    }
    output.edges.push(EdgeCandidate {
        source: source.to_string(),
        target: target.to_string(),
        field: field.name.clone(),
        provenance: Provenance::FolderNote,
        source_order: Some(EdgeOrder::Last),
        target_order: Some(EdgeOrder::Last),
    });
}
