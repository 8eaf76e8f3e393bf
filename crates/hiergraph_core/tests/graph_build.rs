use hiergraph_core::{
    build_graph, Direction, EdgeKey, EdgeOrder, FieldTable, GraphSnapshot, InMemoryWorkspace,
    Provenance, Settings,
};
use serde_json::json;

fn key(snapshot: &GraphSnapshot, source: &str, target: &str, field: &str) -> EdgeKey {
    EdgeKey::new(source, target, field_of(&snapshot.field_table, field))
}

fn field_of<'t>(table: &'t FieldTable, name: &str) -> &'t hiergraph_core::HierarchyField {
    table.get(name).unwrap()
}

fn date_settings(stretch: bool) -> Settings {
    let mut settings = Settings::default();
    settings.date_note.enabled = true;
    settings.date_note.default_field = Some("next".to_string());
    settings.date_note.stretch_to_existing = stretch;
    settings
}

#[test]
fn duplicate_links_yield_one_edge() {
    let ws = InMemoryWorkspace::new()
        .with_document("A.md", json!({ "up": ["[[B]]", "[[B]]", ["[[B|again]]"]] }))
        .with_document("B.md", json!({}));

    let snapshot = build_graph(&ws, &Settings::default());
    let up_edges: Vec<_> = snapshot
        .graph
        .edges()
        .filter(|edge| edge.field() == "up")
        .collect();
    assert_eq!(up_edges.len(), 1);
    assert_eq!(snapshot.graph.edge_count(), 2);
}

#[test]
fn closure_adds_exactly_one_reciprocal() {
    let ws = InMemoryWorkspace::new()
        .with_document("A.md", json!({ "up": "[[B]]" }))
        .with_document("B.md", json!({}));

    let snapshot = build_graph(&ws, &Settings::default());
    let implied: Vec<_> = snapshot
        .graph
        .edges()
        .filter(|edge| !edge.attrs.explicit)
        .collect();
    assert_eq!(implied.len(), 1);
    assert_eq!(implied[0].source(), "B.md");
    assert_eq!(implied[0].target(), "A.md");
    assert_eq!(implied[0].field(), "down");
    assert_eq!(implied[0].attrs.direction, Direction::Down);
    assert_eq!(snapshot.graph.edge_count(), 2);
}

#[test]
fn explicit_edge_wins_over_implied_candidate() {
    let ws = InMemoryWorkspace::new()
        .with_document("A.md", json!({ "down": "[[B]]" }))
        .with_document("B.md", json!({ "up": "[[A]]" }));

    let snapshot = build_graph(&ws, &Settings::default());
    assert_eq!(snapshot.graph.edge_count(), 2);
    let down = snapshot
        .graph
        .edge(&key(&snapshot, "A.md", "B.md", "down"))
        .unwrap();
    assert!(down.attrs.explicit);
    assert_eq!(down.attrs.provenance, Provenance::Field);
    assert_eq!(snapshot.graph.explicit_edge_count(), 2);
}

#[test]
fn strict_date_chaining_targets_next_calendar_day() {
    let ws = InMemoryWorkspace::new()
        .with_document("2024-01-01.md", json!({}))
        .with_document("2024-01-03.md", json!({}));

    let snapshot = build_graph(&ws, &date_settings(false));
    let graph = &snapshot.graph;
    assert!(graph.has_edge(&key(&snapshot, "2024-01-01.md", "2024-01-02.md", "next")));
    assert!(graph.has_edge(&key(&snapshot, "2024-01-03.md", "2024-01-04.md", "next")));
    assert!(!graph.has_edge(&key(&snapshot, "2024-01-01.md", "2024-01-03.md", "next")));
    assert!(!graph.node("2024-01-02.md").unwrap().resolved);
    assert!(!graph.node("2024-01-04.md").unwrap().resolved);

    let edge = graph
        .edge(&key(&snapshot, "2024-01-01.md", "2024-01-02.md", "next"))
        .unwrap();
    assert_eq!(edge.attrs.provenance, Provenance::DateNote);
    assert!(graph.has_edge(&key(&snapshot, "2024-01-02.md", "2024-01-01.md", "prev")));
}

#[test]
fn stretch_date_chaining_skips_the_gap() {
    let ws = InMemoryWorkspace::new()
        .with_document("2024-01-01.md", json!({}))
        .with_document("2024-01-03.md", json!({}));

    let snapshot = build_graph(&ws, &date_settings(true));
    assert!(snapshot
        .graph
        .has_edge(&key(&snapshot, "2024-01-01.md", "2024-01-03.md", "next")));
    assert!(!snapshot.graph.has_node("2024-01-02.md"));
}

#[test]
fn folder_note_links_siblings_without_self_loop() {
    let ws = InMemoryWorkspace::new()
        .with_document("X/F.md", json!({ "BC-folder-note": "down" }))
        .with_document("X/A.md", json!({}))
        .with_document("X/B.md", json!({}));

    let snapshot = build_graph(&ws, &Settings::default());
    let graph = &snapshot.graph;
    assert!(graph.has_edge(&key(&snapshot, "X/F.md", "X/A.md", "down")));
    assert!(graph.has_edge(&key(&snapshot, "X/F.md", "X/B.md", "down")));
    assert!(!graph.has_edge(&key(&snapshot, "X/F.md", "X/F.md", "down")));
    assert_eq!(graph.explicit_edge_count(), 2);
}

#[test]
fn recursive_folder_note_chains_subfolders_with_last_order() {
    let ws = InMemoryWorkspace::new()
        .with_document(
            "X/F.md",
            json!({ "BC-folder-note": "down", "BC-folder-note-recursive": "true" }),
        )
        .with_document("X/Y/C.md", json!({}));

    let snapshot = build_graph(&ws, &Settings::default());
    let graph = &snapshot.graph;
    for (source, target) in [("X/F.md", "X/Y.md"), ("X/Y.md", "X/Y/C.md")] {
        let edge = graph.edge(&key(&snapshot, source, target, "down")).unwrap();
        assert_eq!(edge.attrs.source_order, Some(EdgeOrder::Last));
        assert_eq!(edge.attrs.target_order, Some(EdgeOrder::Last));
        assert_eq!(edge.attrs.provenance, Provenance::FolderNote);
    }
    assert!(!graph.node("X/Y.md").unwrap().resolved);
}

#[test]
fn unresolved_target_becomes_virtual_node() {
    let ws = InMemoryWorkspace::new().with_document("A.md", json!({ "up": "[[Ghost]]" }));

    let snapshot = build_graph(&ws, &Settings::default());
    assert!(!snapshot.graph.node("Ghost.md").unwrap().resolved);
    assert!(snapshot
        .graph
        .has_edge(&key(&snapshot, "A.md", "Ghost.md", "up")));
    assert!(snapshot.errors.is_empty());
}

#[test]
fn ranked_targets_follow_target_order() {
    let ws = InMemoryWorkspace::new()
        .with_document("P.md", json!({ "down": ["[[A]]", "[[B]]", "[[C]]"] }))
        .with_document("A.md", json!({ "order": 2 }))
        .with_document("B.md", json!({ "order": "1" }))
        .with_document("C.md", json!({}));

    let snapshot = build_graph(&ws, &Settings::default());
    let ranked: Vec<&str> = snapshot
        .ranked_targets("P.md", "down")
        .iter()
        .map(|edge| edge.target())
        .collect();
    assert_eq!(ranked, vec!["B.md", "A.md", "C.md"]);
    assert_eq!(snapshot.orders.key("B.md", "down").value(), Some(1.0));
}

#[test]
fn page_index_backend_reads_link_structs() {
    let mut ws = InMemoryWorkspace::new()
        .with_document("notes/A.md", json!({ "up": "[[Wrong]]" }))
        .with_document("notes/Parent.md", json!({}));
    let mut page = hiergraph_core::FieldMap::new();
    page.insert(
        "up".to_string(),
        hiergraph_core::RawValue::link("notes/Parent.md"),
    );
    ws.set_page("notes/A.md", page);

    let mut settings = Settings::default();
    settings.metadata_backend = hiergraph_core::MetadataBackend::PageIndex;
    let snapshot = build_graph(&ws, &settings);
    assert!(snapshot
        .graph
        .has_edge(&key(&snapshot, "notes/A.md", "notes/Parent.md", "up")));
    assert!(!snapshot.graph.has_node("Wrong.md"));
}

#[test]
fn custom_hierarchies_from_json_settings() {
    let settings = Settings::from_json_str(
        r#"{
            "hierarchies": [
                { "up": "parent", "down": "child", "same": "sibling" },
                { "up": "topic", "implied": false }
            ],
            "implied": { "siblings_from_parent": true }
        }"#,
    )
    .unwrap();
    let ws = InMemoryWorkspace::new()
        .with_document("A.md", json!({ "parent": "[[P]]", "topic": "[[T]]" }))
        .with_document("B.md", json!({ "parent": "[[P]]" }))
        .with_document("P.md", json!({}))
        .with_document("T.md", json!({}));

    let snapshot = build_graph(&ws, &settings);
    let graph = &snapshot.graph;
    assert!(graph.has_edge(&key(&snapshot, "P.md", "A.md", "child")));
    assert!(graph.has_edge(&key(&snapshot, "A.md", "B.md", "sibling")));
    assert!(graph.has_edge(&key(&snapshot, "B.md", "A.md", "sibling")));
    assert!(graph.has_edge(&key(&snapshot, "A.md", "T.md", "topic")));
    assert_eq!(graph.in_edges("A.md").filter(|e| e.source() == "T.md").count(), 0);
    assert!(snapshot.errors.is_empty());
}

#[test]
fn unreadable_metadata_is_reported_and_build_completes() {
    let mut ws = InMemoryWorkspace::new()
        .with_document("A.md", json!({ "up": "[[B]]" }))
        .with_document("B.md", json!({ "up": "[[A]]" }));
    ws.mark_unreadable("B.md");

    let snapshot = build_graph(&ws, &Settings::default());
    assert_eq!(snapshot.errors.len(), 1);
    assert_eq!(snapshot.errors[0].path, "B.md");
    assert_eq!(snapshot.errors[0].code.as_str(), "metadata_read_failure");
    assert!(snapshot.graph.has_edge(&key(&snapshot, "A.md", "B.md", "up")));
    assert!(snapshot.graph.node("B.md").unwrap().resolved);
}
