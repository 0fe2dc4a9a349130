//! Shared fixtures for unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

use crate::config::DiffConfig;
use crate::telemetry::InMemoryMetrics;

/// Builds a config that runs `/bin/sh` in `dir`.
///
/// With `/bin/sh` as the binary, `sh init ...` executes the script file
/// named `init` in the working directory, so tests can fake Terraform by
/// writing one script per sub-command.
pub fn config_with_metrics(dir: &Path, metrics: Arc<InMemoryMetrics>) -> DiffConfig {
    DiffConfig {
        binary: PathBuf::from("/bin/sh"),
        config_files: PathBuf::from("."),
        working_dir: dir.to_path_buf(),
        log_level: None,
        lock: false,
        timeout: None,
        aws_credentials: None,
        github_token: None,
        metrics,
    }
}

/// Same as [`config_with_metrics`] with a throwaway recorder.
pub fn config_in(dir: &Path) -> DiffConfig {
    config_with_metrics(dir, Arc::new(InMemoryMetrics::new()))
}

/// Creates a temp directory holding one shell script per `(name, body)` pair.
pub fn workspace(scripts: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for (name, body) in scripts {
        std::fs::write(dir.path().join(name), body).expect("Failed to write script");
    }
    dir
}

/// Serializes tests that read or change the process working directory.
static CURRENT_DIR: Mutex<()> = Mutex::new(());

/// Takes the working-directory lock without moving.
pub fn lock_current_dir() -> MutexGuard<'static, ()> {
    CURRENT_DIR.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Restores the previous working directory when dropped.
pub struct CurrentDirGuard {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

/// Moves the process into `dir` until the guard is dropped.
pub fn enter_dir(dir: &Path) -> CurrentDirGuard {
    let lock = lock_current_dir();
    let previous = std::env::current_dir().expect("Failed to read current dir");
    std::env::set_current_dir(dir).expect("Failed to enter dir");
    CurrentDirGuard {
        previous,
        _lock: lock,
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}
