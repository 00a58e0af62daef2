//! Domain model for outlines, tasks and projects.
//!
//! # Responsibility
//! - Define the canonical data structures shared by derivation, layout and
//!   persistence.
//!
//! # Invariants
//! - Tasks are identified by the stable key of the outline entry they come
//!   from.
//! - The task containment tree is an arena; no task owns another.

pub mod outline;
pub mod project;
pub mod task;
