//! Project use-case service.
//!
//! # Responsibility
//! - Create, update, list and delete projects through a repository.
//! - Own the `last_modified` and naming rules applied on every update.
//!
//! # Invariants
//! - `last_modified` strictly increases on every successful update.
//! - A project's name follows the first outline line when that line is not
//!   blank.

use crate::graph::GraphModelError;
use crate::model::project::{now_epoch_ms, Project, ProjectSummary};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PROJECT_NAME: &str = "New Project";

pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

#[derive(Debug)]
pub enum ProjectServiceError {
    ProjectNotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// A graph edit made through a session was rejected.
    Graph(GraphModelError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<GraphModelError> for ProjectServiceError {
    fn from(value: GraphModelError) -> Self {
        Self::Graph(value)
    }
}

/// Use-case wrapper around a [`ProjectRepository`].
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and stores a project seeded with the starter outline.
    pub fn create_project(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ProjectServiceResult<Project> {
        let project = Project::new(name, description);
        self.repo.save_project(&project)?;
        info!("event=project_create module=service status=ok");
        Ok(project)
    }

    pub fn get_project(&self, id: &str) -> ProjectServiceResult<Project> {
        self.repo
            .get_project(id)?
            .ok_or_else(|| ProjectServiceError::ProjectNotFound(id.to_string()))
    }

    /// Summaries sorted by `last_modified DESC, id ASC`.
    pub fn list_projects(&self) -> ProjectServiceResult<Vec<ProjectSummary>> {
        Ok(self.repo.list_projects()?)
    }

    /// Stores `project`, bumping `last_modified` and renaming it after its
    /// first outline line.
    ///
    /// # Errors
    /// [`ProjectServiceError::ProjectNotFound`] when no project with this id
    /// was stored before.
    pub fn update_project(&self, mut project: Project) -> ProjectServiceResult<Project> {
        let stored = self
            .repo
            .get_project(&project.id)?
            .ok_or_else(|| ProjectServiceError::ProjectNotFound(project.id.clone()))?;

        project.last_modified = now_epoch_ms().max(stored.last_modified + 1);
        project.refresh_name_from_outline();
        self.repo.save_project(&project)?;
        info!("event=project_update module=service status=ok");
        Ok(project)
    }

    pub fn delete_project(&self, id: &str) -> ProjectServiceResult<()> {
        if !self.repo.delete_project(id)? {
            return Err(ProjectServiceError::ProjectNotFound(id.to_string()));
        }
        info!("event=project_delete module=service status=ok");
        Ok(())
    }

    /// Flips the `completed` flag and stores the project.
    pub fn toggle_completion(&self, id: &str) -> ProjectServiceResult<Project> {
        let mut project = self.get_project(id)?;
        project.completed = !project.completed;
        self.update_project(project)
    }
}
