//! Project use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into project-level operations.
//! - Bind graph editing to debounced persistence for open projects.

pub mod debounce;
pub mod project_service;
pub mod project_session;
