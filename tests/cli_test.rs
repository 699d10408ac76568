//! Startup behaviour of the taskboard binary.
//!
//! The interactive loop needs a terminal, so these tests only cover paths
//! that exit before the terminal is taken over.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_help_lists_storage_option() {
    let env = TestEnv::new();
    env.taskboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"));
}

#[test]
fn test_version() {
    let env = TestEnv::new();
    env.taskboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("taskboard"));
}

#[test]
fn test_unreadable_task_file_fails_startup() {
    let env = TestEnv::new();
    // A directory where the task file should be cannot be read as CSV.
    let path = env.task_file();
    fs::create_dir_all(&path).unwrap();

    env.taskboard()
        .arg("--file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open task file"));
}

#[test]
fn test_malformed_task_file_fails_startup() {
    let env = TestEnv::new();
    let path = env.task_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "id,title,status\n42,broken,Nowhere\n").unwrap();

    env.taskboard()
        .env("TASKBOARD_FILE", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed task file"));
}

#[test]
fn test_startup_failure_is_logged() {
    let env = TestEnv::new();
    let path = env.task_file();
    fs::create_dir_all(&path).unwrap();

    env.taskboard().arg("--file").arg(&path).assert().failure();
    let log = fs::read_to_string(env.log_file()).unwrap();
    assert!(log.contains("cannot open task file"));
}
