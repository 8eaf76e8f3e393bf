//! Field builder: edges from per-document hierarchy fields.

use crate::builders::{BuildContext, BuilderOutput, EdgeCandidate};
use crate::graph::{EdgeOrder, Provenance};
use crate::metadata::field_targets;

/// Path used for a link target that does not resolve to a document.
pub fn virtual_target_path(link_text: &str) -> String {
    if link_text.ends_with(".md") {
        link_text.to_string()
    } else {
        format!("{link_text}.md")
    }
}

pub(crate) fn build(ctx: &BuildContext<'_>) -> BuilderOutput {
    let mut output = BuilderOutput::default();
    let order_field = ctx.settings.order_field.as_str();

    for record in ctx.records {
        let source_order = record.order(order_field).map(EdgeOrder::Value);
        for field in ctx.field_table.fields() {
            for link_text in field_targets(record, field.name.as_str()) {
                let target = ctx
                    .host
                    .resolve_link(link_text.as_str(), record.path.as_str())
                    .unwrap_or_else(|| virtual_target_path(link_text.as_str()));
                // Target order comes from the target's own record, not the source's.
                let target_order = ctx.order_of(target.as_str());
                output.edges.push(EdgeCandidate {
                    source: record.path.clone(),
                    target,
                    field: field.name.clone(),
                    provenance: Provenance::Field,
                    source_order,
                    target_order,
                });
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{build, virtual_target_path};
    use crate::builders::BuildContext;
    use crate::config::{MetadataBackend, Settings};
    use crate::error::BuildErrors;
    use crate::graph::EdgeOrder;
    use crate::host::InMemoryWorkspace;
    use crate::metadata::normalize_documents;
    use crate::model::hierarchy::FieldTable;
    use serde_json::json;

    #[test]
    fn virtual_paths_gain_markdown_extension_once() {
        assert_eq!(virtual_target_path("Ghost"), "Ghost.md");
        assert_eq!(virtual_target_path("Ghost.md"), "Ghost.md");
    }

    #[test]
    fn emits_one_candidate_per_link_with_cross_document_orders() {
        let ws = InMemoryWorkspace::new()
            .with_document("kids/A.md", json!({ "up": "[[Parent]]", "order": 2 }))
            .with_document("Parent.md", json!({ "down": ["[[A]]", "[[Ghost]]"], "order": 7 }));
        let settings = Settings::default();
        let mut errors = BuildErrors::new();
        let table = FieldTable::from_hierarchies(&settings.hierarchies, &mut errors);
        let records = normalize_documents(&ws, MetadataBackend::Frontmatter, &mut errors);
        let ctx = BuildContext::new(&ws, &records, &table, &settings);

        let output = build(&ctx);
        assert!(output.errors.is_empty());
        assert_eq!(output.edges.len(), 3);

        let up = output
            .edges
            .iter()
            .find(|edge| edge.field == "up")
            .expect("up candidate");
        assert_eq!(up.source, "kids/A.md");
        assert_eq!(up.target, "Parent.md");
        assert_eq!(up.source_order, Some(EdgeOrder::Value(2.0)));
        assert_eq!(up.target_order, Some(EdgeOrder::Value(7.0)));

        let ghost = output
            .edges
            .iter()
            .find(|edge| edge.target == "Ghost.md")
            .expect("ghost candidate");
        assert_eq!(ghost.source_order, Some(EdgeOrder::Value(7.0)));
        assert_eq!(ghost.target_order, None);
    }
}
