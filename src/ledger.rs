use crate::db::{now_timestamp, Store, StoreError};
use rusqlite::{OptionalExtension, TransactionBehavior};
use serde::Serialize;

/// What `record_if_higher` did to the stored grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerWrite {
    Inserted { score: i64 },
    Raised { previous: i64, score: i64 },
    Kept { stored: i64 },
}

impl LedgerWrite {
    /// Best score on record after the write.
    pub fn best(self) -> i64 {
        match self {
            Self::Inserted { score } | Self::Raised { score, .. } => score,
            Self::Kept { stored } => stored,
        }
    }

    pub fn wrote(self) -> bool {
        !matches!(self, Self::Kept { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    pub assignment_id: i64,
    pub student_id: i64,
    pub username: Option<String>,
    pub grade: i64,
    pub updated_at: Option<String>,
}

/// Stores `score` for the pair unless an equal or higher score is already on record.
///
/// The read and the write run in one `BEGIN IMMEDIATE` transaction, so the write lock is
/// held before the stored value is read and concurrent submissions for the same pair are
/// serialized.
pub fn record_if_higher(
    store: &Store,
    assignment_id: i64,
    student_id: i64,
    score: i64,
) -> Result<LedgerWrite, StoreError> {
    let mut conn = store.connect()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let stored: Option<i64> = tx
        .query_row(
            "SELECT grade FROM grades WHERE assignment_id = ? AND student_id = ?",
            (assignment_id, student_id),
            |r| r.get(0),
        )
        .optional()?;

    let write = match stored {
        None => {
            tx.execute(
                "INSERT INTO grades(assignment_id, student_id, grade, updated_at)
                 VALUES(?, ?, ?, ?)",
                (assignment_id, student_id, score, now_timestamp()),
            )?;
            LedgerWrite::Inserted { score }
        }
        Some(previous) if score > previous => {
            tx.execute(
                "UPDATE grades SET grade = ?, updated_at = ?
                 WHERE assignment_id = ? AND student_id = ?",
                (score, now_timestamp(), assignment_id, student_id),
            )?;
            LedgerWrite::Raised { previous, score }
        }
        Some(stored) => LedgerWrite::Kept { stored },
    };
    tx.commit()?;

    tracing::debug!(
        event = "grade_recorded",
        assignment_id,
        student_id,
        score,
        best = write.best(),
        wrote = write.wrote()
    );
    Ok(write)
}

pub fn find(store: &Store, assignment_id: i64, student_id: i64) -> Result<Option<i64>, StoreError> {
    let conn = store.connect()?;
    let grade = conn
        .query_row(
            "SELECT grade FROM grades WHERE assignment_id = ? AND student_id = ?",
            (assignment_id, student_id),
            |r| r.get(0),
        )
        .optional()?;
    Ok(grade)
}

pub fn list_for_assignment(store: &Store, assignment_id: i64) -> Result<Vec<GradeRow>, StoreError> {
    let conn = store.connect()?;
    let mut stmt = conn.prepare(
        "SELECT g.assignment_id, g.student_id, u.username, g.grade, g.updated_at
         FROM grades g
         LEFT JOIN users u ON u.id = g.student_id
         WHERE g.assignment_id = ?
         ORDER BY g.student_id",
    )?;
    let rows = stmt
        .query_map([assignment_id], |row| {
            Ok(GradeRow {
                assignment_id: row.get(0)?,
                student_id: row.get(1)?,
                username: row.get(2)?,
                grade: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
