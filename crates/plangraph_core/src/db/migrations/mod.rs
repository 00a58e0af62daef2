//! Ordered schema migrations.
//!
//! Versions are strictly increasing and mirrored into `PRAGMA user_version`
//! inside the same transaction as the DDL.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Latest schema version this build knows.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Current `PRAGMA user_version` of `conn`.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies every migration newer than the connection's version.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the database is newer than
///   this build.
/// - [`DbError::Migration`] when a script fails. The whole batch is rolled
///   back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_migration_set(conn, MIGRATIONS)
}

fn apply_migration_set(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let from = current_version(conn)?;
    let latest = migrations.last().map_or(0, |migration| migration.version);

    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations.iter().filter(|m| m.version > from) {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| {
                error!(
                    "event=db_migrate module=db status=error from_version={from} failed_version={}",
                    migration.version
                );
                DbError::Migration {
                    version: migration.version,
                    source,
                }
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migration_set, current_version, Migration};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn failing_script_rolls_back_the_whole_batch() {
        let mut conn = Connection::open_in_memory().expect("open raw connection");
        let migrations = [
            Migration {
                version: 1,
                sql: "CREATE TABLE kept (id INTEGER);",
            },
            Migration {
                version: 2,
                sql: "CREATE TABLE broken (;",
            },
        ];

        match apply_migration_set(&mut conn, &migrations) {
            Err(DbError::Migration { version, .. }) => assert_eq!(version, 2),
            other => panic!("expected migration error, got {other:?}"),
        }
        assert_eq!(current_version(&conn).expect("version"), 0);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table';",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(tables, 0);
    }
}
