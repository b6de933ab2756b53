use anyhow::Context;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DB_FILE: &str = "sqltester.sqlite3";
pub const DATASET_FILE: &str = "dataset.sqlite3";

/// Errors from the grading store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("assignment {0} not found")]
    AssignmentNotFound(i64),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Handle to the grading database. Holds only the location; every operation
/// acquires its own connection and releases it when the operation returns.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    /// Open `<workspace>/sqltester.sqlite3`, creating the folder and schema if needed.
    pub fn open_workspace(workspace: &Path, busy_timeout: Duration) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!(
                "failed to create workspace {}",
                workspace.to_string_lossy()
            )
        })?;
        let store = Self::open(workspace.join(DB_FILE), busy_timeout)
            .context("failed to initialize grading database")?;
        Ok(store)
    }

    pub fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            busy_timeout,
        };
        let conn = store.connect()?;
        init_schema(&conn)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(conn)
    }
}

pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            instructions TEXT NOT NULL DEFAULT '',
            answer_key TEXT NOT NULL DEFAULT '',
            created_at TEXT
        )",
        [],
    )?;
    ensure_assignments_updated_at(conn)?;

    // No ON DELETE CASCADE: grades are removed explicitly inside the delete transaction.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            assignment_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            grade INTEGER NOT NULL,
            PRIMARY KEY(assignment_id, student_id),
            FOREIGN KEY(assignment_id) REFERENCES assignments(id)
        )",
        [],
    )?;
    ensure_grades_updated_at(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_student ON grades(student_id)",
        [],
    )?;

    Ok(())
}

fn ensure_assignments_updated_at(conn: &Connection) -> rusqlite::Result<()> {
    if table_has_column(conn, "assignments", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE assignments ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn ensure_grades_updated_at(conn: &Connection) -> rusqlite::Result<()> {
    if table_has_column(conn, "grades", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE grades ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
