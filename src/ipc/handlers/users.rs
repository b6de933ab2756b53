use crate::ipc::error::{respond, IpcError};
use crate::ipc::helpers::{store, str_param};
use crate::ipc::types::{AppState, Request};
use crate::users::User;
use serde_json::json;

fn users_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, IpcError> {
    let Some(store) = state.store.as_ref() else {
        return Ok(json!({ "users": [] }));
    };
    Ok(json!({ "users": User::find_all(store)? }))
}

fn users_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, IpcError> {
    let store = store(state)?;
    let username = str_param(req, "username")?.trim();
    if username.is_empty() {
        return Err(IpcError::bad_params("username must not be empty"));
    }
    let user = User::create(store, username).map_err(|e| IpcError::store(e, "db_insert_failed"))?;
    Ok(json!({ "userId": user.id, "username": user.username }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "users.list" => users_list(state, req),
        "users.create" => users_create(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
