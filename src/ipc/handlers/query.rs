use crate::executor::{ExecError, QueryExecutor};
use crate::ipc::error::{respond, IpcError};
use crate::ipc::helpers::{executor, str_param};
use crate::ipc::types::{AppState, Request};
use crate::normalize::normalize;
use serde_json::json;

/// Runs ad-hoc text against the dataset without grading it.
fn query_test(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let executor = executor(state)?;
    let sql = str_param(req, "sql")?;
    if sql.trim().is_empty() {
        return Err(IpcError::bad_params("query must not be empty"));
    }

    let result = executor.execute(sql).map_err(|e| match e {
        ExecError::Unavailable(_) => IpcError::new("dataset_unavailable", e.to_string()),
        ExecError::Query(msg) => IpcError::new("query_failed", msg),
    })?;
    Ok(json!({
        "columns": &result.columns,
        "rows": &result.rows,
        "rowCount": result.row_count(),
        "canonical": normalize(&result),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "query.test" => query_test(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
