//! Task domain model.
//!
//! # Responsibility
//! - Define work items derived from outline entries and the cross-links
//!   between them.
//! - Store the containment tree as an id-indexed arena instead of nested
//!   ownership.
//!
//! # Invariants
//! - `sub_tasks` forms a tree; every child's `parent_id` names the task that
//!   lists it.
//! - Depth strictly increases from parent to child.
//! - Relationships are independent from containment; they never change
//!   `parent_id` or `sub_tasks`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable task identifier, taken from the outline entry key.
pub type TaskId = String;

/// Stable relationship identifier.
pub type RelationshipId = String;

/// Persisted per-task status, keyed by task id.
pub type TaskMetadataMap = BTreeMap<TaskId, TaskMetadata>;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Pending,
    /// Work is in progress.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Returns the wire name used by serde and status class hints.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Pending and in-progress tasks still block their dependents.
    pub fn is_incomplete(self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Folds child statuses into a group status.
    ///
    /// `completed` when every child is completed, `pending` when every child
    /// is pending, `in_progress` otherwise. Returns `None` for no children.
    pub fn aggregate(children: impl IntoIterator<Item = TaskStatus>) -> Option<TaskStatus> {
        let mut all_completed = true;
        let mut all_pending = true;
        let mut seen = false;
        for status in children {
            seen = true;
            all_completed &= status == Self::Completed;
            all_pending &= status == Self::Pending;
        }
        if !seen {
            return None;
        }
        Some(if all_completed {
            Self::Completed
        } else if all_pending {
            Self::Pending
        } else {
            Self::InProgress
        })
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One work item derived from an outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    /// `None` until a readiness strategy annotates the forest.
    pub ready: Option<bool>,
    /// Nesting level from the outline. Structural only.
    pub depth: u32,
    /// Containment parent. `None` means root task.
    pub parent_id: Option<TaskId>,
    /// Ordered child ids.
    pub sub_tasks: Vec<TaskId>,
}

impl Task {
    /// Creates a pending root-level task without children.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>, depth: u32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            ready: None,
            depth,
            parent_id: None,
            sub_tasks: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.sub_tasks.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Directed cross-link between two tasks, independent of containment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub source_id: TaskId,
    pub target_id: TaskId,
}

impl Relationship {
    /// Creates a relationship with a freshly generated id.
    pub fn new(source_id: impl Into<TaskId>, target_id: impl Into<TaskId>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), source_id, target_id)
    }

    /// Creates a relationship with a caller-provided id.
    ///
    /// Used by load/import paths where identity already exists.
    pub fn with_id(
        id: impl Into<RelationshipId>,
        source_id: impl Into<TaskId>,
        target_id: impl Into<TaskId>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }

    pub fn connects(&self, source_id: &str, target_id: &str) -> bool {
        self.source_id == source_id && self.target_id == target_id
    }
}

/// Persisted status record for one task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub id: TaskId,
    pub status: TaskStatus,
}

impl TaskMetadata {
    pub fn new(id: impl Into<TaskId>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Arena of tasks with a parent/children index.
///
/// Tasks are stored in insertion order. Roots and children keep outline
/// order, which makes every traversal deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForest {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
    roots: Vec<TaskId>,
}

impl TaskForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task and links it under `task.parent_id`.
    ///
    /// Returns `false` and leaves the forest unchanged when the id is already
    /// present or the named parent does not exist.
    pub fn insert(&mut self, mut task: Task) -> bool {
        if self.index.contains_key(&task.id) {
            return false;
        }
        task.sub_tasks.clear();
        match task.parent_id.clone() {
            Some(parent_id) => {
                let Some(&parent_idx) = self.index.get(&parent_id) else {
                    return false;
                };
                self.tasks[parent_idx].sub_tasks.push(task.id.clone());
            }
            None => self.roots.push(task.id.clone()),
        }
        self.index.insert(task.id.clone(), self.tasks.len());
        self.tasks.push(task);
        true
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&idx| &self.tasks[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.index.get(id).map(|&idx| &mut self.tasks[idx])
    }

    /// Root tasks in outline order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> + '_ {
        self.roots.iter().filter_map(|id| self.get(id))
    }

    pub fn root_ids(&self) -> &[TaskId] {
        &self.roots
    }

    /// Direct children of `id` in outline order. Empty for unknown ids.
    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Task> + 'a {
        self.get(id)
            .map(|task| task.sub_tasks.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child_id| self.get(child_id))
    }

    pub fn parent_of(&self, id: &str) -> Option<&Task> {
        self.get(id)
            .and_then(|task| task.parent_id.as_deref())
            .and_then(|parent_id| self.get(parent_id))
    }

    /// Pre-order traversal: each task before its sub-tasks, siblings in
    /// outline order.
    pub fn pre_order(&self) -> Vec<&Task> {
        let mut ordered = Vec::with_capacity(self.tasks.len());
        let mut stack: Vec<&TaskId> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            let Some(task) = self.get(id) else {
                continue;
            };
            ordered.push(task);
            stack.extend(task.sub_tasks.iter().rev());
        }
        ordered
    }

    /// Pre-order list of ids. Handy when the caller needs `get_mut` during
    /// the walk.
    pub fn pre_order_ids(&self) -> Vec<TaskId> {
        self.pre_order()
            .into_iter()
            .map(|task| task.id.clone())
            .collect()
    }

    /// Whether two tasks may be linked: both roots, or same immediate parent.
    ///
    /// Returns `false` if either id is unknown.
    pub fn share_container(&self, a: &str, b: &str) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(left), Some(right)) => left.parent_id == right.parent_id,
            _ => false,
        }
    }

    /// Effective status per task: own status for leaves, aggregated child
    /// status for groups.
    pub fn effective_statuses(&self) -> HashMap<TaskId, TaskStatus> {
        let mut effective: HashMap<TaskId, TaskStatus> = HashMap::with_capacity(self.len());
        for task in self.pre_order().into_iter().rev() {
            let status = TaskStatus::aggregate(
                task.sub_tasks
                    .iter()
                    .filter_map(|child_id| effective.get(child_id).copied()),
            )
            .unwrap_or(task.status);
            effective.insert(task.id.clone(), status);
        }
        effective
    }

    /// Nested, owned view of the forest for serialization.
    pub fn to_tree(&self) -> Vec<TaskTree> {
        self.roots().map(|root| self.subtree(root)).collect()
    }

    fn subtree(&self, task: &Task) -> TaskTree {
        TaskTree {
            id: task.id.clone(),
            description: task.description.clone(),
            status: task.status,
            ready: task.ready,
            depth: task.depth,
            parent_id: task.parent_id.clone(),
            sub_tasks: self
                .children(&task.id)
                .map(|child| self.subtree(child))
                .collect(),
        }
    }
}

/// Nested task representation matching the outline shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTree {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub sub_tasks: Vec<TaskTree>,
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskForest, TaskStatus};

    fn child(id: &str, parent: &str, depth: u32) -> Task {
        let mut task = Task::new(id, id, depth);
        task.parent_id = Some(parent.to_string());
        task
    }

    #[test]
    fn aggregate_follows_all_or_mixed_rule() {
        use TaskStatus::*;
        assert_eq!(TaskStatus::aggregate([Completed, Completed]), Some(Completed));
        assert_eq!(TaskStatus::aggregate([Pending, Pending]), Some(Pending));
        assert_eq!(TaskStatus::aggregate([Pending, Completed]), Some(InProgress));
        assert_eq!(TaskStatus::aggregate(std::iter::empty()), None);
    }

    #[test]
    fn insert_links_children_and_rejects_duplicates() {
        let mut forest = TaskForest::new();
        assert!(forest.insert(Task::new("a", "A", 0)));
        assert!(forest.insert(child("a1", "a", 1)));
        assert!(!forest.insert(Task::new("a", "again", 0)));
        assert!(!forest.insert(child("x", "missing", 1)));

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.get("a").unwrap().sub_tasks, vec!["a1".to_string()]);
        assert_eq!(forest.parent_of("a1").unwrap().id, "a");
    }

    #[test]
    fn pre_order_visits_parent_before_children() {
        let mut forest = TaskForest::new();
        forest.insert(Task::new("a", "A", 0));
        forest.insert(child("a1", "a", 1));
        forest.insert(child("a2", "a", 1));
        forest.insert(Task::new("b", "B", 0));
        forest.insert(child("a1x", "a1", 2));

        let ids: Vec<&str> = forest.pre_order().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn effective_status_aggregates_nested_groups() {
        let mut forest = TaskForest::new();
        forest.insert(Task::new("a", "A", 0));
        forest.insert(child("a1", "a", 1));
        forest.insert(child("a2", "a", 1));
        forest.get_mut("a1").unwrap().status = TaskStatus::Completed;

        let effective = forest.effective_statuses();
        assert_eq!(effective["a"], TaskStatus::InProgress);
        assert_eq!(effective["a1"], TaskStatus::Completed);
        assert_eq!(effective["a2"], TaskStatus::Pending);
    }

    #[test]
    fn share_container_requires_same_parent() {
        let mut forest = TaskForest::new();
        forest.insert(Task::new("a", "A", 0));
        forest.insert(Task::new("b", "B", 0));
        forest.insert(child("a1", "a", 1));
        forest.insert(child("a2", "a", 1));

        assert!(forest.share_container("a", "b"));
        assert!(forest.share_container("a1", "a2"));
        assert!(!forest.share_container("a1", "b"));
        assert!(!forest.share_container("a1", "missing"));
    }
}
