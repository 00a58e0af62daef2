//! Outline entry model.
//!
//! # Responsibility
//! - Describe the editor-agnostic record the deriver reads: text, block
//!   type, nesting depth and stable key.
//!
//! # Invariants
//! - `key` is stable across edits of the same entry and unique within one
//!   outline.

use serde::{Deserialize, Serialize};

pub const BLOCK_UNSTYLED: &str = "unstyled";
pub const BLOCK_UNORDERED_LIST_ITEM: &str = "unordered-list-item";
pub const BLOCK_ORDERED_LIST_ITEM: &str = "ordered-list-item";

/// One block of the structured outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Stable block key. Becomes the task id for list items.
    pub key: String,
    /// Editor block type, e.g. `header-two` or `unordered-list-item`.
    pub block_type: String,
    pub text: String,
    /// Nesting depth. Only meaningful for list items.
    #[serde(default)]
    pub depth: u32,
}

impl OutlineEntry {
    pub fn new(
        key: impl Into<String>,
        block_type: impl Into<String>,
        text: impl Into<String>,
        depth: u32,
    ) -> Self {
        Self {
            key: key.into(),
            block_type: block_type.into(),
            text: text.into(),
            depth,
        }
    }

    /// Shorthand for an unordered list item.
    pub fn list_item(key: impl Into<String>, text: impl Into<String>, depth: u32) -> Self {
        Self::new(key, BLOCK_UNORDERED_LIST_ITEM, text, depth)
    }

    /// Shorthand for a heading block.
    pub fn header(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(key, "header-two", text, 0)
    }

    /// Both ordered and unordered list items count.
    pub fn is_list_item(&self) -> bool {
        self.block_type.ends_with("list-item")
    }
}
