use sqltesterd::config::DaemonConfig;
use sqltesterd::ipc;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the protocol; logs go to stderr.
    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cfg = DaemonConfig::from_env();
    init_logging(&cfg.log_level);
    tracing::info!(event = "daemon_start", config = ?cfg);

    let mut state = ipc::AppState::new(cfg.busy_timeout(), cfg.dataset.clone());
    if let Some(workspace) = cfg.workspace.as_deref() {
        if let Err(e) = ipc::select_workspace(&mut state, workspace, None) {
            tracing::error!(event = "workspace_open_failed", error = %format!("{e:#}"));
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(event = "bad_json", error = %e);
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(event = "request", id = %req.id, method = %req.method);
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
