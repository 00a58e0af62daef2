//! Project record model.
//!
//! # Responsibility
//! - Bundle one outline with its relationships and persisted task status.
//! - Provide the list-view summary shape.
//!
//! # Invariants
//! - `id` is stable for the project lifetime.
//! - `last_modified` is epoch milliseconds and only moves forward through
//!   the service layer.

use crate::model::outline::{OutlineEntry, BLOCK_UNORDERED_LIST_ITEM};
use crate::model::task::{Relationship, TaskMetadataMap};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = String;

/// Storage format version written with every project.
pub const PROJECT_FORMAT_VERSION: &str = "0";

/// Everything the graph is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContent {
    pub outline: Vec<OutlineEntry>,
    pub relationships: Vec<Relationship>,
    pub task_metadata: TaskMetadataMap,
}

impl ProjectContent {
    /// Starter outline for new projects: a title, a `Tasks` header and two
    /// root tasks.
    pub fn starter() -> Self {
        let outline = vec![
            OutlineEntry::new(short_key(), "header-one", "Project Plan", 0),
            OutlineEntry::new(short_key(), "header-two", "Tasks", 0),
            OutlineEntry::new(short_key(), BLOCK_UNORDERED_LIST_ITEM, "Task 1", 0),
            OutlineEntry::new(short_key(), BLOCK_UNORDERED_LIST_ITEM, "Task 2", 0),
        ];
        Self {
            outline,
            ..Self::default()
        }
    }
}

/// List-view metadata for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub completed: bool,
    pub last_modified: i64,
}

/// Full project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub completed: bool,
    pub last_modified: i64,
    pub content: ProjectContent,
}

impl Project {
    /// Creates an unsaved project with a generated id and the starter
    /// outline.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            version: PROJECT_FORMAT_VERSION.to_string(),
            completed: false,
            last_modified: now_epoch_ms(),
            content: ProjectContent::starter(),
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            completed: self.completed,
            last_modified: self.last_modified,
        }
    }

    /// Names the project after the first outline line when it is not blank.
    ///
    /// Returns whether the name changed.
    pub fn refresh_name_from_outline(&mut self) -> bool {
        let Some(first) = self.content.outline.first() else {
            return false;
        };
        let title = first.text.trim();
        if title.is_empty() || title == self.name {
            return false;
        }
        self.name = title.to_string();
        true
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn short_key() -> String {
    let mut key = Uuid::new_v4().simple().to_string();
    key.truncate(8);
    key
}
