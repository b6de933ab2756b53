use crate::db::{Store, StoreError};
use rusqlite::ErrorCode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl User {
    pub fn find_all(store: &Store) -> Result<Vec<Self>, StoreError> {
        let conn = store.connect()?;
        let mut stmt = conn.prepare("SELECT id, username FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], |row| {
                Ok(Self {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn create(store: &Store, username: &str) -> Result<Self, StoreError> {
        let conn = store.connect()?;
        match conn.execute("INSERT INTO users(username) VALUES(?)", [username]) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::UsernameTaken(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Self {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }
}
