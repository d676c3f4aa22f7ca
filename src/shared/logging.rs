use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn engine_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/engine.log")
}

pub fn append_engine_log_line(state_root: &Path, line: &str) -> std::io::Result<()> {
    let path = engine_log_path(state_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{line}")
}

/// Handle for the append-only engine diagnostics log. Failures to write are
/// swallowed; diagnostics never fail a run.
#[derive(Debug, Clone)]
pub struct EngineLog {
    state_root: PathBuf,
}

impl EngineLog {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    pub fn append(&self, now: i64, scope_id: &str, message: impl AsRef<str>) {
        let line = format!("ts={now} id={scope_id} {}", message.as_ref());
        let _ = append_engine_log_line(&self.state_root, &line);
    }
}
