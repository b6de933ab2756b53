use crate::normalize::QueryResult;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    /// The dataset itself could not be reached. Never the submitter's fault.
    #[error("dataset unavailable: {0}")]
    Unavailable(String),

    /// The query text was rejected or failed while running.
    #[error("{0}")]
    Query(String),
}

/// Runs arbitrary query text and returns the fetched rows as text.
pub trait QueryExecutor {
    fn execute(&self, sql: &str) -> Result<QueryResult, ExecError>;
}

/// Executes against a SQLite dataset opened read-only, one connection per call.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    dataset: PathBuf,
}

impl SqliteExecutor {
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    pub fn dataset(&self) -> &Path {
        &self.dataset
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, sql: &str) -> Result<QueryResult, ExecError> {
        let conn = Connection::open_with_flags(
            &self.dataset,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ExecError::Unavailable(e.to_string()))?;
        // Opening is lazy; touch the header so a bad file fails here even for queries
        // that never read a table.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| ExecError::Unavailable(e.to_string()))?;
        run_query(&conn, sql).map_err(|e| {
            if is_dataset_fault(&e) {
                ExecError::Unavailable(e.to_string())
            } else {
                ExecError::Query(e.to_string())
            }
        })
    }
}

/// Failures caused by the dataset file rather than the query text.
fn is_dataset_fault(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if matches!(
                f.code,
                ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
            )
    )
}

pub fn run_query(conn: &Connection, sql: &str) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(render_value(row.get_ref(i)?));
        }
        out.push(values);
    }

    Ok(QueryResult { columns, rows: out })
}

fn render_value(v: ValueRef<'_>) -> Option<String> {
    match v {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(hex::encode(b)),
    }
}
