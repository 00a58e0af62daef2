//! Diagram view: positioned nodes with status hints, plus edges.

use crate::derive::DerivedGraph;
use crate::layout::{Direction, Layout, LayoutEdge, NodeSpec, Point, Size};
use crate::model::task::{TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

/// One box of the rendered diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub label: String,
    /// Parent-local for children, absolute for roots.
    pub position: Point,
    pub absolute: Point,
    pub size: Size,
    /// Own status for leaves, aggregated child status for groups.
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    /// Visual hint, e.g. `in_progress` or `pending_ready`.
    pub status_class: String,
    pub is_group: bool,
}

/// Directed edge between two diagram nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub id: String,
    pub source: TaskId,
    pub target: TaskId,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub direction: Direction,
    /// Parents always precede their children.
    pub nodes: Vec<DiagramNode>,
    /// Edges that took part in layout.
    pub edges: Vec<DiagramEdge>,
    /// Relationship ids the layout dropped as non-local.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unplaced_edges: Vec<String>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// Flattens a derived graph into layout input, tasks in pre-order.
pub fn layout_input(graph: &DerivedGraph) -> (Vec<NodeSpec>, Vec<LayoutEdge>) {
    let nodes = graph
        .forest
        .pre_order()
        .into_iter()
        .map(|task| NodeSpec {
            id: task.id.clone(),
            parent_id: task.parent_id.clone(),
        })
        .collect();
    let edges = graph
        .relationships
        .iter()
        .map(|rel| LayoutEdge::new(rel.id.clone(), rel.source_id.clone(), rel.target_id.clone()))
        .collect();
    (nodes, edges)
}

/// `"{status}"`, or `"{status}_ready"` when the task is ready.
pub fn status_class(status: TaskStatus, ready: Option<bool>) -> String {
    if ready == Some(true) {
        format!("{status}_ready")
    } else {
        status.to_string()
    }
}

/// Joins derived tasks with their layout boxes.
///
/// Tasks the layout did not place are left out.
pub fn build_diagram(graph: &DerivedGraph, layout: &Layout, direction: Direction) -> Diagram {
    let effective = graph.forest.effective_statuses();

    let nodes = graph
        .forest
        .pre_order()
        .into_iter()
        .filter_map(|task| {
            let placed = layout.node(&task.id)?;
            let status = effective.get(&task.id).copied().unwrap_or(task.status);
            Some(DiagramNode {
                id: task.id.clone(),
                parent_id: task.parent_id.clone(),
                label: task.description.clone(),
                position: placed.position,
                absolute: placed.absolute,
                size: placed.size,
                status,
                ready: task.ready,
                status_class: status_class(status, task.ready),
                is_group: !task.is_leaf(),
            })
        })
        .collect();

    let unplaced_edges: Vec<String> = layout
        .dropped_edges
        .iter()
        .map(|edge| edge.id.clone())
        .collect();
    let edges = graph
        .relationships
        .iter()
        .filter(|rel| !unplaced_edges.contains(&rel.id))
        .map(|rel| DiagramEdge {
            id: rel.id.clone(),
            source: rel.source_id.clone(),
            target: rel.target_id.clone(),
        })
        .collect();

    Diagram {
        direction,
        nodes,
        edges,
        unplaced_edges,
    }
}
