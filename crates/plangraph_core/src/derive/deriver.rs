//! Task forest derivation and metadata/relationship reconciliation.

use crate::derive::readiness::{DisabledReadiness, ReadinessStrategy};
use crate::model::outline::OutlineEntry;
use crate::model::task::{Relationship, Task, TaskForest, TaskMetadataMap};
use log::debug;

const TASKS_HEADER: &str = "tasks";

/// Result of one full derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedGraph {
    pub forest: TaskForest,
    /// Metadata entries whose task still exists. Everything else is dropped.
    pub metadata: TaskMetadataMap,
    /// Relationships whose endpoints both still exist, in input order.
    pub relationships: Vec<Relationship>,
}

/// Derives task graphs from outlines.
pub struct GraphDeriver {
    readiness: Box<dyn ReadinessStrategy>,
}

impl Default for GraphDeriver {
    fn default() -> Self {
        Self::new(Box::new(DisabledReadiness))
    }
}

impl GraphDeriver {
    /// Creates a deriver using the given readiness strategy.
    pub fn new(readiness: Box<dyn ReadinessStrategy>) -> Self {
        Self { readiness }
    }

    pub fn readiness_name(&self) -> &'static str {
        self.readiness.name()
    }

    /// Rebuilds the forest from `entries` and garbage-collects `metadata`
    /// and `relationships` against it.
    ///
    /// # Contract
    /// - Tasks with a metadata entry take its status; all others are
    ///   `pending`.
    /// - Only metadata for surviving task ids is returned.
    /// - Only relationships with both endpoints present are returned.
    pub fn derive(
        &self,
        entries: &[OutlineEntry],
        metadata: &TaskMetadataMap,
        relationships: &[Relationship],
    ) -> DerivedGraph {
        let mut forest = parse_outline(entries);

        let mut retained_metadata = TaskMetadataMap::new();
        for id in forest.pre_order_ids() {
            let Some(entry) = metadata.get(&id) else {
                continue;
            };
            if let Some(task) = forest.get_mut(&id) {
                task.status = entry.status;
            }
            retained_metadata.insert(id, entry.clone());
        }

        let retained_relationships: Vec<Relationship> = relationships
            .iter()
            .filter(|rel| forest.contains(&rel.source_id) && forest.contains(&rel.target_id))
            .cloned()
            .collect();

        debug!(
            "event=derive module=derive status=ok tasks={} metadata_in={} metadata_kept={} relationships_in={} relationships_kept={}",
            forest.len(),
            metadata.len(),
            retained_metadata.len(),
            relationships.len(),
            retained_relationships.len()
        );

        let mut derived = DerivedGraph {
            forest,
            metadata: retained_metadata,
            relationships: retained_relationships,
        };
        self.annotate_readiness(&mut derived);
        derived
    }

    /// Recomputes readiness flags in place without re-parsing.
    pub fn annotate_readiness(&self, graph: &mut DerivedGraph) {
        self.readiness
            .annotate(&mut graph.forest, &graph.metadata, &graph.relationships);
    }
}

/// Parses the `Tasks` section of an outline into a forest.
///
/// # Contract
/// - List items count as tasks only after a non-list entry reading `Tasks`
///   (trimmed, case-insensitive).
/// - The first non-list entry after at least one task ends the scan.
/// - Nesting follows depth: a task becomes a child of the nearest preceding
///   open task with a smaller depth, or a root when none is open.
pub fn parse_outline(entries: &[OutlineEntry]) -> TaskForest {
    let mut forest = TaskForest::new();
    let mut in_task_section = false;
    // (task id, depth) of currently open ancestors.
    let mut open: Vec<(String, u32)> = Vec::new();

    for entry in entries {
        if !entry.is_list_item() {
            if !forest.is_empty() {
                break;
            }
            in_task_section = entry.text.trim().to_lowercase() == TASKS_HEADER;
            continue;
        }
        if !in_task_section {
            continue;
        }

        while open.last().is_some_and(|(_, depth)| *depth >= entry.depth) {
            open.pop();
        }

        let mut task = Task::new(entry.key.clone(), entry.text.trim(), entry.depth);
        task.parent_id = open.last().map(|(id, _)| id.clone());
        if !forest.insert(task) {
            debug!(
                "event=derive_skip module=derive status=skip reason=duplicate_key depth={}",
                entry.depth
            );
            continue;
        }
        open.push((entry.key.clone(), entry.depth));
    }

    forest
}

#[cfg(test)]
mod tests {
    use super::{parse_outline, GraphDeriver};
    use crate::derive::PrerequisiteReadiness;
    use crate::model::outline::OutlineEntry;
    use crate::model::task::{Relationship, TaskMetadata, TaskMetadataMap, TaskStatus};

    fn header(key: &str, text: &str) -> OutlineEntry {
        OutlineEntry::header(key, text)
    }

    fn item(key: &str, text: &str, depth: u32) -> OutlineEntry {
        OutlineEntry::list_item(key, text, depth)
    }

    #[test]
    fn readiness_name_reports_the_strategy() {
        assert_eq!(GraphDeriver::default().readiness_name(), "disabled");
        let deriver = GraphDeriver::new(Box::new(PrerequisiteReadiness));
        assert_eq!(deriver.readiness_name(), "prerequisite");
    }

    #[test]
    fn list_items_before_tasks_header_are_ignored() {
        let forest = parse_outline(&[
            header("h0", "Notes"),
            item("n1", "not a task", 0),
            header("h1", "  TASKS "),
            item("t1", "Task 1", 0),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.root_ids().to_vec(), vec!["t1".to_string()]);
    }

    #[test]
    fn first_non_list_entry_after_tasks_ends_scan() {
        let forest = parse_outline(&[
            header("h", "Tasks"),
            item("t1", "Task 1", 0),
            OutlineEntry::new("p", "unstyled", "Done with tasks", 0),
            header("h2", "Tasks"),
            item("t2", "Task 2", 0),
        ]);
        assert_eq!(forest.len(), 1);
        assert!(!forest.contains("t2"));
    }

    #[test]
    fn deeper_items_without_open_parent_become_roots() {
        let forest = parse_outline(&[header("h", "Tasks"), item("t1", "Deep", 2)]);
        let root = forest.get("t1").unwrap();
        assert!(root.is_root());
        assert_eq!(root.depth, 2);
    }

    #[test]
    fn depth_decrease_pops_back_to_matching_ancestor() {
        let forest = parse_outline(&[
            header("h", "Tasks"),
            item("a", "A", 0),
            item("a1", "A.1", 1),
            item("a1x", "A.1.x", 2),
            item("a2", "A.2", 1),
            item("b", "B", 0),
        ]);
        assert_eq!(forest.get("a1x").unwrap().parent_id.as_deref(), Some("a1"));
        assert_eq!(forest.get("a2").unwrap().parent_id.as_deref(), Some("a"));
        assert!(forest.get("b").unwrap().is_root());
        assert_eq!(
            forest.get("a").unwrap().sub_tasks,
            vec!["a1".to_string(), "a2".to_string()]
        );
    }

    #[test]
    fn descriptions_are_trimmed() {
        let forest = parse_outline(&[header("h", "Tasks"), item("t", "  spaced  ", 0)]);
        assert_eq!(forest.get("t").unwrap().description, "spaced");
    }

    #[test]
    fn duplicate_keys_keep_first_entry() {
        let forest = parse_outline(&[
            header("h", "Tasks"),
            item("t", "first", 0),
            item("t", "second", 0),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.get("t").unwrap().description, "first");
    }

    #[test]
    fn derive_applies_metadata_and_drops_stale_entries() {
        let mut metadata = TaskMetadataMap::new();
        metadata.insert("t1".into(), TaskMetadata::new("t1", TaskStatus::Completed));
        metadata.insert("gone".into(), TaskMetadata::new("gone", TaskStatus::InProgress));
        let relationships = vec![
            Relationship::with_id("r1", "t1", "t2"),
            Relationship::with_id("r2", "t1", "gone"),
        ];

        let derived = GraphDeriver::default().derive(
            &[header("h", "Tasks"), item("t1", "One", 0), item("t2", "Two", 0)],
            &metadata,
            &relationships,
        );

        assert_eq!(derived.forest.get("t1").unwrap().status, TaskStatus::Completed);
        assert_eq!(derived.forest.get("t2").unwrap().status, TaskStatus::Pending);
        assert_eq!(derived.metadata.keys().collect::<Vec<_>>(), vec!["t1"]);
        assert_eq!(derived.relationships.len(), 1);
        assert_eq!(derived.relationships[0].id, "r1");
    }

    #[test]
    fn missing_header_yields_empty_graph() {
        let derived = GraphDeriver::default().derive(
            &[item("t1", "One", 0)],
            &TaskMetadataMap::new(),
            &[Relationship::with_id("r", "t1", "t1")],
        );
        assert!(derived.forest.is_empty());
        assert!(derived.relationships.is_empty());
        assert!(derived.metadata.is_empty());
    }
}
