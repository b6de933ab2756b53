use crate::db::{now_timestamp, Store, StoreError};
use rusqlite::{OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    pub answer_key: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub answer_key: String,
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, instructions, answer_key, created_at, updated_at FROM assignments";

impl Assignment {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            instructions: row.get(2)?,
            answer_key: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    pub fn find_all(store: &Store) -> Result<Vec<Self>, StoreError> {
        let conn = store.connect()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let assignments = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    pub fn find(store: &Store, id: i64) -> Result<Option<Self>, StoreError> {
        let conn = store.connect()?;
        let assignment = conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id], Self::from_row)
            .optional()?;
        Ok(assignment)
    }

    pub fn create(store: &Store, input: &AssignmentInput) -> Result<Self, StoreError> {
        let conn = store.connect()?;
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO assignments(name, instructions, answer_key, created_at, updated_at)
             VALUES(?, ?, ?, ?, ?)",
            (&input.name, &input.instructions, &input.answer_key, &now, &now),
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(event = "assignment_created", assignment_id = id);

        Ok(Self {
            id,
            name: input.name.clone(),
            instructions: input.instructions.clone(),
            answer_key: input.answer_key.clone(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
    }

    pub fn update(store: &Store, id: i64, input: &AssignmentInput) -> Result<Self, StoreError> {
        let conn = store.connect()?;
        let changed = conn.execute(
            "UPDATE assignments
             SET name = ?, instructions = ?, answer_key = ?, updated_at = ?
             WHERE id = ?",
            (
                &input.name,
                &input.instructions,
                &input.answer_key,
                now_timestamp(),
                id,
            ),
        )?;
        if changed == 0 {
            return Err(StoreError::AssignmentNotFound(id));
        }
        let updated = conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?"),
            [id],
            Self::from_row,
        )?;
        Ok(updated)
    }

    /// Removes the assignment and every grade that references it in one transaction.
    /// Returns the number of grades removed. Nothing is removed when the assignment
    /// does not exist.
    pub fn delete_cascade(store: &Store, id: i64) -> Result<usize, StoreError> {
        let mut conn = store.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let grades_removed = tx.execute("DELETE FROM grades WHERE assignment_id = ?", [id])?;
        let removed = tx.execute("DELETE FROM assignments WHERE id = ?", [id])?;
        if removed == 0 {
            tx.rollback()?;
            return Err(StoreError::AssignmentNotFound(id));
        }
        tx.commit()?;

        tracing::info!(
            event = "assignment_deleted",
            assignment_id = id,
            grades_removed
        );
        Ok(grades_removed)
    }
}
