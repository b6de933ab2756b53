use std::path::PathBuf;
use std::time::Duration;

use crate::db::Store;
use crate::executor::SqliteExecutor;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub executor: Option<SqliteExecutor>,
    pub busy_timeout: Duration,
    /// Dataset used for every workspace instead of `<workspace>/dataset.sqlite3`.
    pub dataset_override: Option<PathBuf>,
}

impl AppState {
    pub fn new(busy_timeout: Duration, dataset_override: Option<PathBuf>) -> Self {
        Self {
            workspace: None,
            store: None,
            executor: None,
            busy_timeout,
            dataset_override,
        }
    }
}
