#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use parsehost::message::{Level, LogSink};

/// Captures every sink call as (level, text).
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(Level, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn at(&self, level: Level) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.calls.lock().unwrap().push((level, message.to_string()));
    }
}

impl LogSink for RecordingSink {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }
    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("parsehost-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write an executable `sh` script at `dir/name`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
