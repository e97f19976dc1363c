//! Seed database copies the solution and submission run against.

pub mod diff;

pub use diff::TableDiff;

use crate::result_set::ResultSet;
use crate::statement::{split, Statement, StatementError};
use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum DatabaseError {
    Io { path: PathBuf, source: std::io::Error },
    Sqlite(rusqlite::Error),
    Script(StatementError),
    StartupScript(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            DatabaseError::Sqlite(e) => write!(f, "{e}"),
            DatabaseError::Script(e) => write!(f, "{e}"),
            DatabaseError::StartupScript(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Io { source, .. } => Some(source),
            DatabaseError::Sqlite(e) => Some(e),
            DatabaseError::Script(e) => Some(e),
            DatabaseError::StartupScript(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        DatabaseError::Sqlite(e)
    }
}

impl From<StatementError> for DatabaseError {
    fn from(e: StatementError) -> Self {
        DatabaseError::Script(e)
    }
}

/// Which copy a connection sees. `Joined` attaches both copies, as
/// `solution` and `submission`, to an in-memory database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    Solution,
    Submission,
    Joined,
}

/// A seed file plus its two working copies for one run.
///
/// Copies are created on first use and reused afterwards, so effects of
/// earlier statements stay visible to later ones.
#[derive(Debug)]
pub struct SeedDatabase {
    name: String,
    source: PathBuf,
    solution_path: PathBuf,
    submission_path: PathBuf,
    connection: Option<(CursorMode, Connection)>,
}

impl SeedDatabase {
    pub fn new(source: impl Into<PathBuf>, workdir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.into(),
            solution_path: workdir.join(format!("{name}.solution")),
            submission_path: workdir.join(format!("{name}.submission")),
            connection: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs one statement on the copy selected by `mode`.
    pub fn execute(
        &mut self,
        mode: CursorMode,
        statement: &Statement,
        max_rows: usize,
    ) -> Result<ResultSet, DatabaseError> {
        self.query(mode, statement.normalized_text(), max_rows)
    }

    pub(crate) fn query(
        &mut self,
        mode: CursorMode,
        sql: &str,
        max_rows: usize,
    ) -> Result<ResultSet, DatabaseError> {
        let conn = self.connect(mode)?;
        let mut stmt = conn.prepare(sql)?;
        Ok(ResultSet::from_statement(max_rows, &mut stmt)?)
    }

    /// Commits and closes the live connection, if any.
    pub fn close(&mut self) -> Result<(), DatabaseError> {
        if let Some((_, conn)) = self.connection.take() {
            finish(conn)?;
        }
        Ok(())
    }

    pub(crate) fn connect(&mut self, mode: CursorMode) -> Result<&Connection, DatabaseError> {
        let conn = match self.connection.take() {
            Some((current, conn)) if current == mode => conn,
            previous => {
                if let Some((_, conn)) = previous {
                    finish(conn)?;
                }
                self.materialize()?;
                self.open(mode)?
            }
        };
        Ok(&self.connection.insert((mode, conn)).1)
    }

    fn materialize(&self) -> Result<(), DatabaseError> {
        for copy in [&self.solution_path, &self.submission_path] {
            if !copy.is_file() {
                std::fs::copy(&self.source, copy).map_err(|source| DatabaseError::Io {
                    path: self.source.clone(),
                    source,
                })?;
                tracing::debug!(
                    event = "judge.db.copy",
                    seed = %self.source.display(),
                    copy = %copy.display()
                );
            }
        }
        Ok(())
    }

    fn open(&self, mode: CursorMode) -> Result<Connection, DatabaseError> {
        let conn = match mode {
            CursorMode::Solution => Connection::open(&self.solution_path)?,
            CursorMode::Submission => Connection::open(&self.submission_path)?,
            CursorMode::Joined => {
                let conn = Connection::open_in_memory()?;
                conn.execute(
                    "ATTACH DATABASE ?1 AS solution",
                    [self.solution_path.to_string_lossy().into_owned()],
                )?;
                conn.execute(
                    "ATTACH DATABASE ?1 AS submission",
                    [self.submission_path.to_string_lossy().into_owned()],
                )?;
                conn
            }
        };
        Ok(conn)
    }
}

impl Drop for SeedDatabase {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(event = "judge.db.close_failed", seed = %self.name, error = %e);
        }
    }
}

fn finish(conn: Connection) -> Result<(), DatabaseError> {
    if !conn.is_autocommit() {
        conn.execute_batch("COMMIT")?;
    }
    conn.close().map_err(|(_, e)| DatabaseError::Sqlite(e))
}

/// Applies a PRAGMA-only startup script to a private copy of `source`.
///
/// Returns the path of the prepared copy, `<workdir>/<name>`.
pub fn prepare_seed(
    source: &Path,
    workdir: &Path,
    name: &str,
    script: &str,
) -> Result<PathBuf, DatabaseError> {
    for statement in split(script)? {
        if !statement.is_pragma() {
            return Err(DatabaseError::StartupScript(format!(
                "Only PRAGMA queries are allowed in the startup script\nreceived '{}' instead.",
                statement.canonical_form()
            )));
        }
    }

    let target = workdir.join(name);
    std::fs::copy(source, &target).map_err(|e| DatabaseError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let conn = Connection::open(&target)?;
    conn.execute_batch(script)?;
    finish(conn)?;

    Ok(target)
}
