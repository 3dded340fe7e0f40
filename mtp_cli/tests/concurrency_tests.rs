//! Concurrency tests for the mtp binary.
//!
//! These tests verify that multiple processes can safely:
//! - Log sessions to the same history file simultaneously
//! - Read history while other processes write

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mtp"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn session_count(data_dir: &Path, key: &str) -> usize {
    let content =
        std::fs::read_to_string(data_dir.join("history.json")).expect("Failed to read history");
    let history: Value = serde_json::from_str(&content).expect("History is not valid JSON");
    history[key].as_array().map(|a| a.len()).unwrap_or(0)
}

fn spawn_logs(data_dir: &Path, machine: &'static str, count: usize) -> Vec<thread::JoinHandle<()>> {
    (0..count)
        .map(|i| {
            let data_dir: PathBuf = data_dir.to_path_buf();
            thread::spawn(move || {
                cli(&data_dir)
                    .args(["log", machine, "heavy", "--set"])
                    .arg(format!("{}x100", 5 + i))
                    .assert()
                    .success();
            })
        })
        .collect()
}

#[test]
fn test_concurrent_session_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for handle in spawn_logs(data_dir, "PRESS", 8) {
        handle.join().expect("Logging thread panicked");
    }

    let count = session_count(data_dir, "15_HEAVY");
    assert_eq!(count, 8, "Expected 8 sessions, got {}", count);
}

#[test]
fn test_concurrent_logging_to_different_machines() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let mut handles = spawn_logs(data_dir, "PRESS", 4);
    handles.extend(spawn_logs(data_dir, "CHEST", 4));
    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }

    // Each write rewrites the whole file, so no key may lose an update
    assert_eq!(session_count(data_dir, "15_HEAVY"), 4);
    assert_eq!(session_count(data_dir, "7_HEAVY"), 4);
}

#[test]
fn test_concurrent_reads_and_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["log", "LAT", "heavy", "--set", "8x80"])
        .assert()
        .success();

    let writers = spawn_logs(data_dir, "LAT", 4);
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let data_dir = data_dir.to_path_buf();
            thread::spawn(move || {
                cli(&data_dir)
                    .args(["suggest", "LAT", "heavy"])
                    .assert()
                    .success()
                    .stderr(predicate::str::contains("Ignoring history").not());
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(session_count(data_dir, "8_HEAVY"), 5);
}
