use crate::db::Store;
use crate::executor::SqliteExecutor;
use crate::ipc::error::IpcError;
use crate::ipc::types::{AppState, Request};
use serde_json::Value;

pub fn store(state: &AppState) -> Result<&Store, IpcError> {
    state
        .store
        .as_ref()
        .ok_or_else(|| IpcError::new("no_workspace", "select a workspace first"))
}

pub fn executor(state: &AppState) -> Result<&SqliteExecutor, IpcError> {
    state
        .executor
        .as_ref()
        .ok_or_else(|| IpcError::new("no_workspace", "select a workspace first"))
}

/// Integer identifier; absent or null is `None`. Numeric strings are accepted because
/// the UI keeps ids in text fields.
pub fn opt_id(req: &Request, key: &str) -> Result<Option<i64>, IpcError> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| IpcError::bad_params(format!("{key} must be an integer"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| IpcError::bad_params(format!("{key} must be an integer"))),
        Some(_) => Err(IpcError::bad_params(format!("{key} must be an integer"))),
    }
}

pub fn id(req: &Request, key: &str) -> Result<i64, IpcError> {
    opt_id(req, key)?.ok_or_else(|| IpcError::bad_params(format!("missing {key}")))
}

pub fn str_param<'a>(req: &'a Request, key: &str) -> Result<&'a str, IpcError> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| IpcError::bad_params(format!("missing {key}")))
}

pub fn opt_str_param<'a>(req: &'a Request, key: &str) -> Result<Option<&'a str>, IpcError> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(IpcError::bad_params(format!("{key} must be a string"))),
    }
}
