//! Editable graph state.
//!
//! # Responsibility
//! - Own the outline, the derived forest, relationships, metadata and the
//!   current layout for one project.
//! - Validate every mutation before applying it.
//!
//! # Invariants
//! - Every stored relationship satisfies the locality rule and names two
//!   tasks of the current forest.
//! - A rejected mutation leaves the model unchanged.
//! - `layout` always reflects the current forest, relationships and
//!   direction; status changes do not affect it.

use crate::derive::{DerivedGraph, GraphDeriver};
use crate::graph::diagram::{build_diagram, layout_input, Diagram};
use crate::layout::{Direction, Layout, LayoutEngine};
use crate::model::outline::OutlineEntry;
use crate::model::project::ProjectContent;
use crate::model::task::{
    Relationship, RelationshipId, TaskForest, TaskId, TaskMetadata, TaskMetadataMap, TaskStatus,
};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected graph mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphModelError {
    TaskNotFound(TaskId),
    /// Endpoints are neither both roots nor siblings.
    NotLocal { source_id: TaskId, target_id: TaskId },
    SelfLink(TaskId),
    /// Status can only be set on leaf tasks.
    NotALeaf(TaskId),
    RelationshipNotFound(RelationshipId),
}

impl Display for GraphModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::NotLocal { .. } => f.write_str(
                "invalid connection: nodes must share the same parent or both be root nodes",
            ),
            Self::SelfLink(id) => {
                write!(f, "invalid connection: task {id} cannot depend on itself")
            }
            Self::NotALeaf(id) => {
                write!(f, "status can only be set on leaf tasks, {id} has sub-tasks")
            }
            Self::RelationshipNotFound(id) => write!(f, "relationship not found: {id}"),
        }
    }
}

impl Error for GraphModelError {}

pub type GraphResult<T> = Result<T, GraphModelError>;

/// Graph state plus the derivation and layout machinery that rebuilds it.
pub struct GraphModel {
    deriver: GraphDeriver,
    engine: LayoutEngine,
    direction: Direction,
    outline: Vec<OutlineEntry>,
    graph: DerivedGraph,
    layout: Layout,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new(GraphDeriver::default(), LayoutEngine::default())
    }
}

impl GraphModel {
    /// Creates an empty model.
    pub fn new(deriver: GraphDeriver, engine: LayoutEngine) -> Self {
        Self {
            deriver,
            engine,
            direction: Direction::default(),
            outline: Vec::new(),
            graph: DerivedGraph::default(),
            layout: Layout::default(),
        }
    }

    /// Creates a model from persisted content, deriving and laying it out.
    ///
    /// Stale metadata and relationships in `content` are dropped.
    pub fn from_content(
        deriver: GraphDeriver,
        engine: LayoutEngine,
        content: &ProjectContent,
        direction: Direction,
    ) -> Self {
        let mut model = Self::new(deriver, engine);
        model.direction = direction;
        model.outline = content.outline.clone();
        model.graph = model.deriver.derive(
            &model.outline,
            &content.task_metadata,
            &content.relationships,
        );
        model.retain_local_relationships();
        model.relayout();
        model
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    pub fn forest(&self) -> &TaskForest {
        &self.graph.forest
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.graph.relationships
    }

    pub fn metadata(&self) -> &TaskMetadataMap {
        &self.graph.metadata
    }

    pub fn derived(&self) -> &DerivedGraph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Renderer view of the current state.
    pub fn diagram(&self) -> Diagram {
        build_diagram(&self.graph, &self.layout, self.direction)
    }

    /// Persistable content: outline, retained relationships and metadata.
    pub fn snapshot(&self) -> ProjectContent {
        ProjectContent {
            outline: self.outline.clone(),
            relationships: self.graph.relationships.clone(),
            task_metadata: self.graph.metadata.clone(),
        }
    }

    /// Replaces the outline, re-derives and relays out.
    ///
    /// Metadata and relationships for tasks that no longer exist are
    /// discarded for good, as are relationships whose endpoints stopped
    /// sharing a container.
    pub fn apply_outline(&mut self, entries: Vec<OutlineEntry>) {
        self.outline = entries;
        self.graph = self.deriver.derive(
            &self.outline,
            &self.graph.metadata,
            &self.graph.relationships,
        );
        self.retain_local_relationships();
        self.relayout();
    }

    /// Adds a relationship `source_id -> target_id` and relays out.
    ///
    /// # Errors
    /// - [`GraphModelError::TaskNotFound`] for unknown ids.
    /// - [`GraphModelError::SelfLink`] when both ids are equal.
    /// - [`GraphModelError::NotLocal`] when the tasks are neither both roots
    ///   nor siblings.
    pub fn connect(&mut self, source_id: &str, target_id: &str) -> GraphResult<RelationshipId> {
        let forest = &self.graph.forest;
        for id in [source_id, target_id] {
            if !forest.contains(id) {
                return Err(GraphModelError::TaskNotFound(id.to_string()));
            }
        }
        if source_id == target_id {
            return Err(GraphModelError::SelfLink(source_id.to_string()));
        }
        if !forest.share_container(source_id, target_id) {
            debug!("event=graph_connect module=graph status=error reason=not_local");
            return Err(GraphModelError::NotLocal {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
            });
        }

        let relationship = Relationship::new(source_id, target_id);
        let id = relationship.id.clone();
        self.graph.relationships.push(relationship);
        self.deriver.annotate_readiness(&mut self.graph);
        self.relayout();
        info!(
            "event=graph_connect module=graph status=ok relationships={}",
            self.graph.relationships.len()
        );
        Ok(id)
    }

    /// Removes one relationship by id and relays out.
    pub fn disconnect(&mut self, relationship_id: &str) -> GraphResult<Relationship> {
        let position = self
            .graph
            .relationships
            .iter()
            .position(|rel| rel.id == relationship_id)
            .ok_or_else(|| GraphModelError::RelationshipNotFound(relationship_id.to_string()))?;
        let removed = self.graph.relationships.remove(position);
        self.deriver.annotate_readiness(&mut self.graph);
        self.relayout();
        Ok(removed)
    }

    /// Removes every relationship `source_id -> target_id`.
    ///
    /// Returns how many were removed; nothing is relaid out when none match.
    pub fn disconnect_between(&mut self, source_id: &str, target_id: &str) -> usize {
        let before = self.graph.relationships.len();
        self.graph
            .relationships
            .retain(|rel| !rel.connects(source_id, target_id));
        let removed = before - self.graph.relationships.len();
        if removed > 0 {
            self.deriver.annotate_readiness(&mut self.graph);
            self.relayout();
        }
        removed
    }

    /// Sets the status of a leaf task and refreshes readiness.
    ///
    /// Layout is untouched; [`GraphModel::diagram`] reflects the new status
    /// hints.
    pub fn set_status(&mut self, task_id: &str, status: TaskStatus) -> GraphResult<()> {
        let task = self
            .graph
            .forest
            .get_mut(task_id)
            .ok_or_else(|| GraphModelError::TaskNotFound(task_id.to_string()))?;
        if !task.is_leaf() {
            return Err(GraphModelError::NotALeaf(task_id.to_string()));
        }
        task.status = status;
        self.graph
            .metadata
            .insert(task_id.to_string(), TaskMetadata::new(task_id, status));
        self.deriver.annotate_readiness(&mut self.graph);
        debug!("event=graph_set_status module=graph status=ok task_status={status}");
        Ok(())
    }

    /// Changes the flow direction and reruns the full layout.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.relayout();
    }

    /// Drops relationships whose endpoints are no longer both roots or
    /// siblings, then refreshes readiness.
    fn retain_local_relationships(&mut self) {
        let forest = &self.graph.forest;
        let before = self.graph.relationships.len();
        self.graph
            .relationships
            .retain(|rel| forest.share_container(&rel.source_id, &rel.target_id));
        let dropped = before - self.graph.relationships.len();
        if dropped > 0 {
            debug!(
                "event=graph_skip module=graph status=skip reason=non_local_relationship dropped={dropped}"
            );
            self.deriver.annotate_readiness(&mut self.graph);
        }
    }

    fn relayout(&mut self) {
        let (nodes, edges) = layout_input(&self.graph);
        self.layout = self.engine.layout(&nodes, &edges, self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphModel, GraphModelError};
    use crate::model::outline::OutlineEntry;
    use crate::model::task::TaskStatus;

    fn model() -> GraphModel {
        let mut model = GraphModel::default();
        model.apply_outline(vec![
            OutlineEntry::header("h", "Tasks"),
            OutlineEntry::list_item("a", "A", 0),
            OutlineEntry::list_item("a1", "A1", 1),
            OutlineEntry::list_item("b", "B", 0),
        ]);
        model
    }

    #[test]
    fn self_link_is_rejected() {
        let mut model = model();
        assert_eq!(
            model.connect("b", "b"),
            Err(GraphModelError::SelfLink("b".to_string()))
        );
        assert!(model.relationships().is_empty());
    }

    #[test]
    fn set_status_rejects_groups_and_unknown_ids() {
        let mut model = model();
        assert_eq!(
            model.set_status("a", TaskStatus::Completed),
            Err(GraphModelError::NotALeaf("a".to_string()))
        );
        assert_eq!(
            model.set_status("zzz", TaskStatus::Completed),
            Err(GraphModelError::TaskNotFound("zzz".to_string()))
        );
        assert!(model.metadata().is_empty());
    }

    #[test]
    fn set_status_updates_metadata_without_relayout() {
        let mut model = model();
        let before = model.layout().clone();
        model.set_status("a1", TaskStatus::Completed).expect("leaf");
        assert_eq!(model.metadata()["a1"].status, TaskStatus::Completed);
        assert_eq!(model.layout(), &before);
        assert_eq!(model.diagram().node("a").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn disconnect_unknown_id_is_an_error() {
        let mut model = model();
        assert_eq!(
            model.disconnect("nope"),
            Err(GraphModelError::RelationshipNotFound("nope".to_string()))
        );
    }

    #[test]
    fn nesting_a_linked_root_drops_the_relationship() {
        let mut model = model();
        model.connect("a", "b").expect("roots");
        model.apply_outline(vec![
            OutlineEntry::header("h", "Tasks"),
            OutlineEntry::list_item("a", "A", 0),
            OutlineEntry::list_item("a1", "A1", 1),
            OutlineEntry::list_item("b", "B", 1),
        ]);

        assert!(model.relationships().is_empty());
        assert!(model.snapshot().relationships.is_empty());
        assert!(model.layout().dropped_edges.is_empty());
    }

    #[test]
    fn disconnect_between_removes_every_duplicate() {
        let mut model = model();
        model.connect("a", "b").expect("roots");
        model.connect("a", "b").expect("roots");
        model.connect("b", "a").expect("roots");
        assert_eq!(model.disconnect_between("a", "b"), 2);
        assert_eq!(model.relationships().len(), 1);
        assert_eq!(model.disconnect_between("a", "b"), 0);
    }
}
