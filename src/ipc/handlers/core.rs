use crate::db::{Store, DATASET_FILE};
use crate::executor::SqliteExecutor;
use crate::ipc::error::{ok, respond, IpcError};
use crate::ipc::helpers::{opt_str_param, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "datasetPath": state.executor.as_ref().map(|e| e.dataset().to_string_lossy().to_string())
        }),
    )
}

/// Opens the grading store under `path` and points query execution at the dataset.
pub fn select_workspace(
    state: &mut AppState,
    path: &Path,
    dataset: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = Store::open_workspace(path, state.busy_timeout)?;
    let dataset = dataset
        .or_else(|| state.dataset_override.clone())
        .unwrap_or_else(|| path.join(DATASET_FILE));

    tracing::info!(
        event = "workspace_selected",
        workspace = %path.display(),
        dataset = %dataset.display()
    );
    state.workspace = Some(path.to_path_buf());
    state.store = Some(store);
    state.executor = Some(SqliteExecutor::new(dataset));
    Ok(())
}

fn workspace_select(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let path = PathBuf::from(str_param(req, "path")?);
    let dataset = opt_str_param(req, "datasetPath")?.map(PathBuf::from);

    select_workspace(state, &path, dataset)
        .map_err(|e| IpcError::new("db_open_failed", format!("{e:#}")))?;

    let dataset = state
        .executor
        .as_ref()
        .map(|e| e.dataset().to_path_buf())
        .unwrap_or_default();
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "datasetPath": dataset.to_string_lossy(),
        "datasetPresent": dataset.is_file(),
    }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = workspace_select(state, req);
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
