//! Corruption recovery tests for repcoach.
//!
//! These tests verify the system can handle:
//! - Corrupted session log lines
//! - Partial writes
//! - Broken library and config files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repcoach").expect("Failed to find repcoach binary");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_wal_lines_ignored_during_read() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("sessions.wal"),
        "{ invalid json }\n{ more invalid }\n",
    )
    .expect("Failed to write corrupted WAL");

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout data yet"));

    // New sessions append after the bad lines and are readable
    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:  1"));
}

#[test]
fn test_partial_wal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success();

    // Simulate a crash halfway through the next append
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("sessions.wal"))
        .unwrap();
    write!(file, r#"{{"id":"00000000-0000-0000-0000-000000000000","plan_id":1,"da"#).unwrap();
    drop(file);

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 sessions to CSV"));
}

#[test]
fn test_corrupted_library_file_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("library.json"), "{ not a library").unwrap();

    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/repcoach");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[goals]\nweekly_workouts = 0\n").unwrap();

    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weekly_workouts"));
}

#[test]
fn test_config_overrides_session_defaults() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/repcoach");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[session]\nsets = 5\nreps = 5\nweight = 20.0\nrest_seconds = 90\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 sets × 5 reps @ 20"))
        .stdout(predicate::str::contains("Rest for 1:30"));
}
