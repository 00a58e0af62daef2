//! One open project: graph edits plus coalesced saves.
//!
//! Structural edits (outline, relationships) schedule a save of the current
//! snapshot through a [`SaveDebouncer`]. Status changes are saved right away
//! and supersede any pending save.
//!
//! A snapshot leaves the debouncer only after the repository accepted it, so
//! a failed save stays pending and the next `tick` or `flush` retries it.

use crate::derive::GraphDeriver;
use crate::graph::{Diagram, GraphModel};
use crate::layout::{Direction, LayoutEngine};
use crate::model::outline::OutlineEntry;
use crate::model::project::Project;
use crate::model::task::{RelationshipId, TaskStatus};
use crate::repo::project_repo::ProjectRepository;
use crate::service::debounce::SaveDebouncer;
use crate::service::project_service::{ProjectService, ProjectServiceResult};
use log::{debug, warn};
use std::time::Instant;

pub struct ProjectSession<'s, R: ProjectRepository> {
    service: &'s ProjectService<R>,
    project: Project,
    model: GraphModel,
    saves: SaveDebouncer<Project>,
}

impl<'s, R: ProjectRepository> ProjectSession<'s, R> {
    /// Loads `id` and derives its graph.
    pub fn open(
        service: &'s ProjectService<R>,
        id: &str,
        deriver: GraphDeriver,
        engine: LayoutEngine,
        direction: Direction,
    ) -> ProjectServiceResult<Self> {
        let project = service.get_project(id)?;
        let model = GraphModel::from_content(deriver, engine, &project.content, direction);
        Ok(Self {
            service,
            project,
            model,
            saves: SaveDebouncer::default(),
        })
    }

    /// Replaces the default save delay.
    pub fn with_debouncer(mut self, saves: SaveDebouncer<Project>) -> Self {
        self.saves = saves;
        self
    }

    /// Last saved (or loaded) project record.
    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn diagram(&self) -> Diagram {
        self.model.diagram()
    }

    pub fn has_pending_save(&self) -> bool {
        self.saves.is_pending()
    }

    pub fn apply_outline(&mut self, entries: Vec<OutlineEntry>, now: Instant) {
        self.model.apply_outline(entries);
        self.schedule_save(now);
    }

    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        now: Instant,
    ) -> ProjectServiceResult<RelationshipId> {
        let id = self.model.connect(source_id, target_id)?;
        self.schedule_save(now);
        Ok(id)
    }

    pub fn disconnect(&mut self, relationship_id: &str, now: Instant) -> ProjectServiceResult<()> {
        self.model.disconnect(relationship_id)?;
        self.schedule_save(now);
        Ok(())
    }

    pub fn disconnect_between(&mut self, source_id: &str, target_id: &str, now: Instant) -> usize {
        let removed = self.model.disconnect_between(source_id, target_id);
        if removed > 0 {
            self.schedule_save(now);
        }
        removed
    }

    /// Sets a leaf status and saves immediately.
    ///
    /// When the save fails the snapshot is scheduled from `now` instead, so
    /// neither the status nor a superseded structural edit is lost.
    pub fn set_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        now: Instant,
    ) -> ProjectServiceResult<()> {
        self.model.set_status(task_id, status)?;
        let snapshot = self.snapshot();
        match self.save(snapshot.clone()) {
            Ok(()) => {
                self.saves.cancel();
                Ok(())
            }
            Err(err) => {
                self.saves.schedule(snapshot, now);
                Err(err)
            }
        }
    }

    /// Direction is a view setting and is not persisted.
    pub fn set_direction(&mut self, direction: Direction) {
        self.model.set_direction(direction);
    }

    /// Saves the pending snapshot if its delay has elapsed.
    ///
    /// Returns whether a save happened. On error the snapshot stays pending.
    pub fn tick(&mut self, now: Instant) -> ProjectServiceResult<bool> {
        let Some(snapshot) = self.saves.due(now).cloned() else {
            return Ok(false);
        };
        self.save(snapshot)?;
        self.saves.cancel();
        Ok(true)
    }

    /// Saves the pending snapshot now, if any.
    pub fn flush(&mut self) -> ProjectServiceResult<bool> {
        let Some(snapshot) = self.saves.pending().cloned() else {
            return Ok(false);
        };
        self.save(snapshot)?;
        self.saves.cancel();
        Ok(true)
    }

    /// Closes the session, dropping any pending save unflushed.
    ///
    /// Returns whether a pending save was dropped.
    pub fn close(mut self) -> bool {
        let dropped = self.saves.cancel();
        if dropped {
            debug!("event=session_close module=service status=ok pending_save_dropped=true");
        }
        dropped
    }

    fn snapshot(&self) -> Project {
        Project {
            content: self.model.snapshot(),
            ..self.project.clone()
        }
    }

    fn schedule_save(&mut self, now: Instant) {
        let snapshot = self.snapshot();
        self.saves.schedule(snapshot, now);
    }

    fn save(&mut self, snapshot: Project) -> ProjectServiceResult<()> {
        match self.service.update_project(snapshot) {
            Ok(saved) => {
                self.project = saved;
                Ok(())
            }
            Err(err) => {
                warn!("event=session_save module=service status=error pending_save_kept=true");
                Err(err)
            }
        }
    }
}
