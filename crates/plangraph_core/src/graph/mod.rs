//! Graph state and its renderer-facing view.
//!
//! [`GraphModel`] rebuilds derivation and layout after every structural
//! edit; [`Diagram`] is the value handed to a renderer.

pub mod diagram;
mod model;

pub use diagram::{Diagram, DiagramEdge, DiagramNode};
pub use model::{GraphModel, GraphModelError, GraphResult};
