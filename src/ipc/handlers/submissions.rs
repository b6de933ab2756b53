use crate::assignments::Assignment;
use crate::grading::{grade_submission, Outcome, Submission};
use crate::ipc::error::{respond, IpcError};
use crate::ipc::helpers::{executor, id, opt_id, store, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn submissions_submit(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let executor = executor(state)?;

    let Some(assignment_id) = opt_id(req, "assignmentId")? else {
        return Err(IpcError::bad_params("select an assignment first"));
    };
    let student_id = id(req, "studentId")?;
    let query = str_param(req, "query")?;

    let assignment = Assignment::find(store, assignment_id)?
        .ok_or_else(|| IpcError::new("not_found", "assignment not found"))?;

    let report = grade_submission(
        store,
        executor,
        &Submission {
            assignment_id,
            student_id,
            student_sql: query,
            answer_sql: &assignment.answer_key,
        },
    )?;

    let message = match &report.outcome {
        Outcome::Graded { score, .. } => format!("You received a score of: {score}"),
        Outcome::QueryFailed { score, .. } => {
            format!("Your query produced an error. Score: {score}")
        }
    };
    Ok(json!({
        "assignmentId": assignment_id,
        "studentId": student_id,
        "score": report.outcome.score(),
        "bestScore": report.ledger.best(),
        "recorded": report.ledger.wrote(),
        "message": message,
        "report": report,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "submissions.submit" => submissions_submit(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
