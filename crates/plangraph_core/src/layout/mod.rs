//! Hierarchical diagram layout.
//!
//! # Responsibility
//! - Size every node of a containment tree bottom-up and place it top-down.
//! - Delegate flat layered placement to a replaceable [`LayeredLayout`].
//!
//! # Invariants
//! - Every child box lies inside its parent's content box (outer box minus
//!   side margins and the top label band).
//! - Sibling boxes never intersect.
//! - The same input always yields bit-identical output.
//! - Input slices are never mutated; every run builds fresh output.

mod engine;
mod layered;
mod types;

pub use engine::LayoutEngine;
pub use layered::{FlatEdge, FlatNode, LayeredLayout, SugiyamaLayout};
pub use types::{
    Direction, Layout, LayoutConfig, LayoutEdge, NodeSpec, Point, PositionedNode, Rect, Size,
    Spacing,
};
