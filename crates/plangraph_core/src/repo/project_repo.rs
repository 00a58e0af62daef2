//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store whole project records keyed by project id.
//! - Serve the project list ordered by most recent modification.
//!
//! # Invariants
//! - `save_project` is an upsert; the stored row always mirrors the latest
//!   saved record.
//! - `list_projects` orders by `last_modified DESC, project_id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::outline::OutlineEntry;
use crate::model::project::{Project, ProjectContent, ProjectSummary};
use crate::model::task::{Relationship, TaskMetadataMap};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PROJECT_SUMMARY_COLUMNS: &str =
    "project_id, name, description, format_version, completed, last_modified";

const REQUIRED_COLUMNS: [&str; 9] = [
    "project_id",
    "name",
    "description",
    "format_version",
    "completed",
    "last_modified",
    "outline_json",
    "relationships_json",
    "task_metadata_json",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from project persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A stored column could not be converted to the model.
    InvalidData(String),
    /// Content JSON failed to encode or decode.
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "project repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "project repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "project repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
            Self::Serialization(err) => write!(f, "project content json error: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage contract for project records.
pub trait ProjectRepository {
    /// Inserts or replaces the project with `project.id`.
    fn save_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: &str) -> RepoResult<Option<Project>>;
    /// All summaries, most recently modified first.
    fn list_projects(&self) -> RepoResult<Vec<ProjectSummary>>;
    /// Returns whether a row was removed.
    fn delete_project(&self, id: &str) -> RepoResult<bool>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// Rejects connections whose schema version or `projects` table does not
    /// match this build.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn save_project(&self, project: &Project) -> RepoResult<()> {
        let outline_json = serde_json::to_string(&project.content.outline)?;
        let relationships_json = serde_json::to_string(&project.content.relationships)?;
        let metadata_json = serde_json::to_string(&project.content.task_metadata)?;

        self.conn.execute(
            "INSERT INTO projects (
                project_id,
                name,
                description,
                format_version,
                completed,
                last_modified,
                outline_json,
                relationships_json,
                task_metadata_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(project_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                format_version = excluded.format_version,
                completed = excluded.completed,
                last_modified = excluded.last_modified,
                outline_json = excluded.outline_json,
                relationships_json = excluded.relationships_json,
                task_metadata_json = excluded.task_metadata_json;",
            params![
                project.id.as_str(),
                project.name.as_str(),
                project.description.as_str(),
                project.version.as_str(),
                bool_to_int(project.completed),
                project.last_modified,
                outline_json,
                relationships_json,
                metadata_json,
            ],
        )?;
        Ok(())
    }

    fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PROJECT_SUMMARY_COLUMNS}, outline_json, relationships_json, task_metadata_json
                     FROM projects
                     WHERE project_id = ?1;"
                ),
                [id],
                |row| {
                    Ok((
                        read_summary(row),
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()?;

        let Some((summary, outline_json, relationships_json, metadata_json)) = raw else {
            return Ok(None);
        };
        let summary = summary?;
        let content = ProjectContent {
            outline: serde_json::from_str::<Vec<OutlineEntry>>(&outline_json)?,
            relationships: serde_json::from_str::<Vec<Relationship>>(&relationships_json)?,
            task_metadata: serde_json::from_str::<TaskMetadataMap>(&metadata_json)?,
        };

        Ok(Some(Project {
            id: summary.id,
            name: summary.name,
            description: summary.description,
            version: summary.version,
            completed: summary.completed,
            last_modified: summary.last_modified,
            content,
        }))
    }

    fn list_projects(&self) -> RepoResult<Vec<ProjectSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_SUMMARY_COLUMNS}
             FROM projects
             ORDER BY last_modified DESC, project_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(read_summary(row)?);
        }
        Ok(summaries)
    }

    fn delete_project(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE project_id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Reads the summary columns; row errors and bad values both become
/// `RepoError`.
fn read_summary(row: &Row<'_>) -> RepoResult<ProjectSummary> {
    let completed: i64 = row.get(4)?;
    Ok(ProjectSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        version: row.get(3)?,
        completed: int_to_bool(completed)?,
        last_modified: row.get(5)?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid completed flag `{other}`"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "projects")? {
        return Err(RepoError::MissingRequiredTable("projects"));
    }
    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "projects", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "projects",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
