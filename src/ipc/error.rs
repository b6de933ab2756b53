use crate::db::StoreError;
use crate::grading::GradeError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

#[derive(Debug, Clone)]
pub struct IpcError {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl IpcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    /// Maps a store failure, using `sqlite_code` for raw database errors.
    pub fn store(e: StoreError, sqlite_code: &str) -> Self {
        match e {
            StoreError::AssignmentNotFound(id) => Self::new("not_found", "assignment not found")
                .with_details(json!({ "assignmentId": id })),
            StoreError::UsernameTaken(name) => Self::new("conflict", "username already taken")
                .with_details(json!({ "username": name })),
            StoreError::Sqlite(e) => Self::new(sqlite_code, e.to_string()),
        }
    }
}

impl From<StoreError> for IpcError {
    fn from(e: StoreError) -> Self {
        Self::store(e, "db_query_failed")
    }
}

impl From<GradeError> for IpcError {
    fn from(e: GradeError) -> Self {
        let message = e.to_string();
        match e {
            GradeError::EmptyQuery => Self::bad_params(message),
            GradeError::AnswerKeyEmpty => Self::new(
                "answer_key_empty",
                "the answer key for this assignment is empty; contact an administrator",
            ),
            GradeError::AnswerKey(db_message) => Self::new(
                "answer_key_failed",
                "the answer key query is invalid; contact an administrator",
            )
            .with_details(json!({ "databaseMessage": db_message })),
            GradeError::DatasetUnavailable(_) => Self::new("dataset_unavailable", message),
            GradeError::Store(e) => Self::store(e, "db_write_failed"),
        }
    }
}

pub fn respond(id: &str, result: Result<serde_json::Value, IpcError>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => err(id, &e.code, e.message, e.details),
    }
}
