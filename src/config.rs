use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DaemonConfig {
    pub log_level: String,
    pub busy_timeout_ms: u64,
    /// Workspace opened before the first request, if any.
    pub workspace: Option<PathBuf>,
    /// Overrides `<workspace>/dataset.sqlite3`.
    pub dataset: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            busy_timeout_ms: 5000,
            workspace: None,
            dataset: None,
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("SQLTESTER_LOG") {
            cfg.log_level = v;
        }
        if let Some(v) = lookup("SQLTESTER_BUSY_TIMEOUT_MS") {
            if let Ok(n) = v.trim().parse() {
                cfg.busy_timeout_ms = n;
            }
        }
        if let Some(v) = lookup("SQLTESTER_WORKSPACE").filter(|v| !v.trim().is_empty()) {
            cfg.workspace = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SQLTESTER_DATASET").filter(|v| !v.trim().is_empty()) {
            cfg.dataset = Some(PathBuf::from(v));
        }
        cfg
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
