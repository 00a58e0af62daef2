//! Outline-to-graph derivation.
//!
//! # Responsibility
//! - Parse the `Tasks` section of an outline into a task forest.
//! - Reconcile persisted status and relationships against that forest.
//! - Annotate readiness through an injected strategy.
//!
//! # Invariants
//! - Derivation never fails; malformed input yields a smaller forest.
//! - Identical inputs produce identical output regardless of prior state.

mod deriver;
mod readiness;

pub use deriver::{parse_outline, DerivedGraph, GraphDeriver};
pub use readiness::{DisabledReadiness, PrerequisiteReadiness, ReadinessStrategy};
