//! Core of PlanGraph: outline-to-diagram derivation and layout.
//!
//! This crate owns every structural invariant: task derivation, locality of
//! relationships, containment layout and project persistence.

pub mod db;
pub mod derive;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod model;
pub mod outline;
pub mod repo;
pub mod service;

pub use derive::{
    parse_outline, DerivedGraph, DisabledReadiness, GraphDeriver, PrerequisiteReadiness,
    ReadinessStrategy,
};
pub use graph::{Diagram, DiagramEdge, DiagramNode, GraphModel, GraphModelError};
pub use layout::{Direction, Layout, LayoutConfig, LayoutEdge, LayoutEngine, NodeSpec};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::outline::OutlineEntry;
pub use model::project::{Project, ProjectContent, ProjectSummary};
pub use model::task::{
    Relationship, Task, TaskForest, TaskMetadata, TaskMetadataMap, TaskStatus, TaskTree,
};
pub use repo::project_repo::{
    ProjectRepository, RepoError, RepoResult, SqliteProjectRepository,
};
pub use service::debounce::SaveDebouncer;
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::project_session::ProjectSession;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
