use crate::assignments::{Assignment, AssignmentInput};
use crate::ipc::error::{respond, IpcError};
use crate::ipc::helpers::{id, opt_id, opt_str_param, store, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn assignments_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, IpcError> {
    let Some(store) = state.store.as_ref() else {
        return Ok(json!({ "assignments": [] }));
    };
    let assignments = Assignment::find_all(store)?;
    Ok(json!({ "assignments": assignments }))
}

fn assignments_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let assignment_id = id(req, "assignmentId")?;
    let assignment = Assignment::find(store, assignment_id)?
        .ok_or_else(|| IpcError::new("not_found", "assignment not found"))?;
    Ok(json!({ "assignment": assignment }))
}

/// Creates when `assignmentId` is absent, updates otherwise.
fn assignments_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let assignment_id = opt_id(req, "assignmentId")?;

    let name = str_param(req, "name")?.trim().to_string();
    if name.is_empty() {
        return Err(IpcError::bad_params("name must not be empty"));
    }
    let input = AssignmentInput {
        name,
        instructions: opt_str_param(req, "instructions")?
            .unwrap_or_default()
            .to_string(),
        answer_key: opt_str_param(req, "answerKey")?
            .unwrap_or_default()
            .to_string(),
    };

    let (assignment, created) = match assignment_id {
        None => (
            Assignment::create(store, &input)
                .map_err(|e| IpcError::store(e, "db_insert_failed"))?,
            true,
        ),
        Some(existing) => (
            Assignment::update(store, existing, &input)
                .map_err(|e| IpcError::store(e, "db_update_failed"))?,
            false,
        ),
    };
    Ok(json!({
        "assignmentId": assignment.id,
        "created": created,
        "assignment": assignment,
    }))
}

fn assignments_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let assignment_id = id(req, "assignmentId")?;
    let grades_removed = Assignment::delete_cascade(store, assignment_id)
        .map_err(|e| IpcError::store(e, "db_delete_failed"))?;
    Ok(json!({
        "assignmentId": assignment_id,
        "gradesRemoved": grades_removed,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.list" => assignments_list(state, req),
        "assignments.get" => assignments_get(state, req),
        "assignments.save" => assignments_save(state, req),
        "assignments.delete" => assignments_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
