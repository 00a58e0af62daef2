use plangraph_core::model::task::{Relationship, TaskMetadata, TaskMetadataMap, TaskStatus};
use plangraph_core::{GraphDeriver, OutlineEntry, PrerequisiteReadiness};

fn tasks_outline(items: &[(&str, &str, u32)]) -> Vec<OutlineEntry> {
    let mut outline = vec![
        OutlineEntry::new("title", "header-one", "Launch", 0),
        OutlineEntry::header("tasks", "Tasks"),
    ];
    outline.extend(
        items
            .iter()
            .map(|(key, text, depth)| OutlineEntry::list_item(*key, *text, *depth)),
    );
    outline
}

#[test]
fn two_flat_items_become_two_roots() {
    let outline = tasks_outline(&[("t1", "Task 1", 0), ("t2", "Task 2", 0)]);
    let graph = GraphDeriver::default().derive(&outline, &TaskMetadataMap::new(), &[]);

    assert_eq!(graph.forest.root_ids().to_vec(), vec!["t1", "t2"]);
    for id in ["t1", "t2"] {
        let task = graph.forest.get(id).unwrap();
        assert!(task.sub_tasks.is_empty());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.ready, None);
    }
    assert!(graph.relationships.is_empty());
}

#[test]
fn deeper_item_nests_under_previous_task() {
    let outline = tasks_outline(&[("t1", "Task 1", 0), ("t11", "Task 1.1", 1)]);
    let graph = GraphDeriver::default().derive(&outline, &TaskMetadataMap::new(), &[]);

    assert_eq!(graph.forest.root_ids().to_vec(), vec!["t1"]);
    assert_eq!(graph.forest.get("t1").unwrap().sub_tasks, vec!["t11"]);
    assert_eq!(
        graph.forest.get("t11").unwrap().parent_id.as_deref(),
        Some("t1")
    );
}

#[test]
fn items_outside_tasks_section_are_ignored() {
    let outline = vec![
        OutlineEntry::header("notes", "Notes"),
        OutlineEntry::list_item("n1", "not a task", 0),
        OutlineEntry::header("tasks", "  TASKS "),
        OutlineEntry::list_item("t1", "Task 1", 0),
        OutlineEntry::new("p", "unstyled", "closing paragraph", 0),
        OutlineEntry::list_item("t2", "after the section", 0),
    ];
    let graph = GraphDeriver::default().derive(&outline, &TaskMetadataMap::new(), &[]);

    assert_eq!(graph.forest.len(), 1);
    assert!(graph.forest.contains("t1"));
}

#[test]
fn missing_header_yields_empty_forest() {
    let outline = vec![
        OutlineEntry::list_item("a", "A", 0),
        OutlineEntry::list_item("b", "B", 1),
    ];
    let graph = GraphDeriver::default().derive(&outline, &TaskMetadataMap::new(), &[]);
    assert!(graph.forest.is_empty());
}

#[test]
fn depth_drop_pops_back_to_matching_ancestor() {
    let outline = tasks_outline(&[
        ("a", "A", 0),
        ("a1", "A1", 1),
        ("a11", "A11", 2),
        ("a2", "A2", 1),
        ("b", "B", 0),
    ]);
    let graph = GraphDeriver::default().derive(&outline, &TaskMetadataMap::new(), &[]);

    assert_eq!(graph.forest.root_ids().to_vec(), vec!["a", "b"]);
    assert_eq!(graph.forest.get("a").unwrap().sub_tasks, vec!["a1", "a2"]);
    assert_eq!(graph.forest.get("a1").unwrap().sub_tasks, vec!["a11"]);
}

#[test]
fn stale_metadata_and_relationships_are_collected() {
    let outline = tasks_outline(&[("a", "A", 0), ("b", "B", 0)]);
    let mut metadata = TaskMetadataMap::new();
    metadata.insert("a".to_string(), TaskMetadata::new("a", TaskStatus::Completed));
    metadata.insert("gone".to_string(), TaskMetadata::new("gone", TaskStatus::InProgress));
    let relationships = vec![
        Relationship::with_id("keep", "a", "b"),
        Relationship::with_id("drop", "a", "gone"),
    ];

    let graph = GraphDeriver::default().derive(&outline, &metadata, &relationships);

    assert_eq!(graph.forest.get("a").unwrap().status, TaskStatus::Completed);
    assert_eq!(graph.forest.get("b").unwrap().status, TaskStatus::Pending);
    assert_eq!(graph.metadata.keys().collect::<Vec<_>>(), vec!["a"]);
    let kept: Vec<&str> = graph.relationships.iter().map(|rel| rel.id.as_str()).collect();
    assert_eq!(kept, vec!["keep"]);
}

#[test]
fn derivation_is_deterministic() {
    let outline = tasks_outline(&[("a", "A", 0), ("a1", "A1", 1), ("b", "B", 0)]);
    let relationships = vec![Relationship::with_id("r", "a", "b")];
    let deriver = GraphDeriver::new(Box::new(PrerequisiteReadiness));

    let first = deriver.derive(&outline, &TaskMetadataMap::new(), &relationships);
    let second = deriver.derive(&outline, &first.metadata, &first.relationships);
    assert_eq!(first, second);
}

#[test]
fn prerequisite_readiness_blocks_until_source_completes() {
    let outline = tasks_outline(&[("a", "A", 0), ("b", "B", 0)]);
    let relationships = vec![Relationship::with_id("r", "a", "b")];
    let deriver = GraphDeriver::new(Box::new(PrerequisiteReadiness));

    let blocked = deriver.derive(&outline, &TaskMetadataMap::new(), &relationships);
    assert_eq!(blocked.forest.get("a").unwrap().ready, Some(true));
    assert_eq!(blocked.forest.get("b").unwrap().ready, Some(false));

    let mut metadata = TaskMetadataMap::new();
    metadata.insert("a".to_string(), TaskMetadata::new("a", TaskStatus::Completed));
    let unblocked = deriver.derive(&outline, &metadata, &relationships);
    assert_eq!(unblocked.forest.get("b").unwrap().ready, Some(true));
}
