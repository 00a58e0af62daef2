//! Readiness strategies.
//!
//! Readiness says whether a task's prerequisites and containment ancestors
//! allow it to start. The rule is injected, not hard-wired: the deriver only
//! knows the [`ReadinessStrategy`] contract.

use crate::model::task::{Relationship, TaskForest, TaskId, TaskMetadataMap};
use std::collections::HashSet;

/// Annotates a derived forest with `ready` flags.
pub trait ReadinessStrategy {
    /// Stable strategy name for diagnostics and CLI selection.
    fn name(&self) -> &'static str;

    /// Writes `ready` on every task of `forest`.
    ///
    /// `relationships` only contains links whose endpoints exist in
    /// `forest`.
    fn annotate(
        &self,
        forest: &mut TaskForest,
        metadata: &TaskMetadataMap,
        relationships: &[Relationship],
    );
}

/// Leaves every task without a readiness flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledReadiness;

impl ReadinessStrategy for DisabledReadiness {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn annotate(
        &self,
        forest: &mut TaskForest,
        _metadata: &TaskMetadataMap,
        _relationships: &[Relationship],
    ) {
        for id in forest.pre_order_ids() {
            if let Some(task) = forest.get_mut(&id) {
                task.ready = None;
            }
        }
    }
}

/// Hierarchy-aware prerequisite readiness.
///
/// - A task is blocked when some relationship points at it from a task whose
///   effective status is not `completed`. Group sources use their aggregated
///   child status.
/// - A root is ready when it is not blocked.
/// - A non-root is ready when it is not blocked and its parent is ready.
///
/// Every task gets `Some(true)` or `Some(false)`, whatever its own status.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrerequisiteReadiness;

impl ReadinessStrategy for PrerequisiteReadiness {
    fn name(&self) -> &'static str {
        "prerequisite"
    }

    fn annotate(
        &self,
        forest: &mut TaskForest,
        _metadata: &TaskMetadataMap,
        relationships: &[Relationship],
    ) {
        let effective = forest.effective_statuses();
        let blocked: HashSet<&TaskId> = relationships
            .iter()
            .filter(|rel| {
                effective
                    .get(&rel.source_id)
                    .is_some_and(|status| status.is_incomplete())
            })
            .map(|rel| &rel.target_id)
            .collect();

        // Pre-order guarantees the parent flag is final before its children.
        let mut ready: HashSet<TaskId> = HashSet::new();
        for task in forest.pre_order() {
            let parent_ready = task
                .parent_id
                .as_ref()
                .map_or(true, |parent_id| ready.contains(parent_id));
            if parent_ready && !blocked.contains(&task.id) {
                ready.insert(task.id.clone());
            }
        }

        for id in forest.pre_order_ids() {
            let is_ready = ready.contains(&id);
            if let Some(task) = forest.get_mut(&id) {
                task.ready = Some(is_ready);
            }
        }
    }
}
