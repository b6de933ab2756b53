use crate::ipc::error::{respond, IpcError};
use crate::ipc::helpers::{id, store};
use crate::ipc::types::{AppState, Request};
use crate::ledger;
use serde_json::json;

fn grades_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let assignment_id = id(req, "assignmentId")?;
    let grades = ledger::list_for_assignment(store, assignment_id)?;
    Ok(json!({ "assignmentId": assignment_id, "grades": grades }))
}

fn grades_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let assignment_id = id(req, "assignmentId")?;
    let student_id = id(req, "studentId")?;
    let grade = ledger::find(store, assignment_id, student_id)?;
    Ok(json!({
        "assignmentId": assignment_id,
        "studentId": student_id,
        "grade": grade,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.list" => grades_list(state, req),
        "grades.get" => grades_get(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
