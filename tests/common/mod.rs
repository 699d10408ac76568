//! Shared helpers for taskboard integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
pub use tempfile::TempDir;

/// Isolated directory holding a task file and a log file.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn task_file(&self) -> PathBuf {
        self.dir.path().join("data").join("tasks.csv")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("taskboard.log")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Command for the taskboard binary with storage and logs inside the env.
    pub fn taskboard(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskboard"));
        cmd.current_dir(self.dir.path());
        cmd.env_remove("TASKBOARD_FILE");
        cmd.env("TASKBOARD_LOG_FILE", self.log_file());
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
