//! Persistence contracts and their SQLite implementations.
//!
//! # Invariants
//! - Repositories only accept connections opened through [`crate::db`].
//! - Content columns hold JSON; a row that fails to decode is reported as
//!   [`project_repo::RepoError::InvalidData`] or
//!   [`project_repo::RepoError::Serialization`], never repaired silently.

pub mod project_repo;
