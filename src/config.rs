//! Command line and environment configuration

use std::path::PathBuf;

use clap::Parser;

/// Storage location used when neither `--file` nor `TASKBOARD_FILE` is set
pub const DEFAULT_TASK_FILE: &str = "data/tasks.csv";

const DEFAULT_LOG_FILE_NAME: &str = "taskboard.log";

#[derive(Debug, Clone, Parser)]
#[command(name = "taskboard", version, about = "Terminal kanban board backed by a CSV file")]
pub struct Config {
    /// CSV file holding the tasks
    #[arg(long, env = "TASKBOARD_FILE", default_value = DEFAULT_TASK_FILE)]
    pub file: PathBuf,

    /// Log file (default: taskboard.log next to the task file)
    #[arg(long, env = "TASKBOARD_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => self.file.with_file_name(DEFAULT_LOG_FILE_NAME),
        }
    }
}
