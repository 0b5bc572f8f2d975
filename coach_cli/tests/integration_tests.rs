//! Integration tests for the repcoach binary.
//!
//! These tests verify end-to-end behavior including:
//! - Plan and exercise browsing
//! - Guided sessions driven through stdin
//! - Session logging, progress and CSV rollup

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from any user config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repcoach").expect("Failed to find repcoach binary");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn wal_lines(dir: &Path) -> Vec<serde_json::Value> {
    let content = fs::read_to_string(dir.join("data/sessions.wal")).unwrap_or_default();
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("WAL line is JSON"))
        .collect()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Workout plans, guided sessions and progress tracking",
        ));
}

#[test]
fn test_plans_lists_builtin_library() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Full Body Starter"))
        .stdout(predicate::str::contains("Upper Body Strength"))
        .stdout(predicate::str::contains("Lower Body Power"));
}

#[test]
fn test_exercises_filter_by_muscle() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["exercises", "--muscle", "Back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pull-up"))
        .stdout(predicate::str::contains("Push-up").not());
}

#[test]
fn test_exercises_search_without_match() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["exercises", "--search", "zumba"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 exercises found"))
        .stdout(predicate::str::contains("Try adjusting your search"));
}

#[test]
fn test_auto_complete_logs_session() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Push-up completed! Great job!"))
        .stdout(predicate::str::contains("Workout completed in 0 min! Amazing work!"));

    let sessions = wal_lines(temp_dir.path());
    assert_eq!(sessions.len(), 1);

    let session = &sessions[0];
    assert_eq!(session["plan_id"], 1);
    assert_eq!(session["completed"], true);

    let exercises = session["exercises"].as_array().expect("exercises array");
    let names: Vec<_> = exercises.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Push-up", "Barbell Squat", "Plank"]);
    assert!(exercises.iter().all(|e| e["completed"] == true));
    assert!(exercises.iter().all(|e| e["sets"] == 3 && e["reps"] == 10));
}

#[test]
fn test_unknown_plan_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "99", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot start workout"));

    assert!(wal_lines(temp_dir.path()).is_empty());
}

#[test]
fn test_interactive_session_with_edits() {
    let temp_dir = setup_test_dir();

    // Bump squat weight, then finish every exercise
    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("\nset weight 62.5\nset reps 8\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise 1 of 3: Push-up"))
        .stdout(predicate::str::contains("Exercise 2 of 3: Barbell Squat"))
        .stdout(predicate::str::contains("Rest for 1:00"))
        .stdout(predicate::str::contains("Workout completed in"));

    let sessions = wal_lines(temp_dir.path());
    assert_eq!(sessions.len(), 1);

    let squat = &sessions[0]["exercises"][1];
    assert_eq!(squat["name"], "Barbell Squat");
    assert_eq!(squat["weight"], 62.5);
    assert_eq!(squat["reps"], 8);
}

#[test]
fn test_invalid_edits_are_clamped() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("set sets 0\nset weight heavy\nset tempo 3\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("tempo"));

    let sessions = wal_lines(temp_dir.path());
    let push_up = &sessions[0]["exercises"][0];
    assert_eq!(push_up["sets"], 1);
    assert_eq!(push_up["weight"], 0.0);
}

#[test]
fn test_exit_with_confirmation_saves_nothing() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "2"])
        .write_stdin("\nq\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout discarded."));

    assert!(wal_lines(temp_dir.path()).is_empty());
}

#[test]
fn test_declined_exit_keeps_session_running() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("q\nn\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout completed in"));

    assert_eq!(wal_lines(temp_dir.path()).len(), 1);
}

#[test]
fn test_closed_input_discards_workout() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Input closed; workout discarded."));

    assert!(wal_lines(temp_dir.path()).is_empty());
}

#[test]
fn test_navigation_and_out_of_order_completion() {
    let temp_dir = setup_test_dir();

    // Skip the push-up; finishing the last exercise ends the workout anyway
    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("n\nn\nn\np\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise 3 of 3: Plank"))
        .stdout(predicate::str::contains("Workout completed in"));

    let sessions = wal_lines(temp_dir.path());
    assert_eq!(sessions.len(), 1);

    let exercises = &sessions[0]["exercises"];
    assert_eq!(exercises[0]["completed"], false);
    assert_eq!(exercises[1]["completed"], true);
    assert_eq!(exercises[2]["completed"], true);
}

#[test]
fn test_memory_backend_writes_nothing() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["--memory", "start", "3", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout completed in"));

    assert!(!temp_dir.path().join("data/sessions.wal").exists());
}

#[test]
fn test_progress_without_sessions() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout data yet"));
}

#[test]
fn test_progress_after_sessions() {
    let temp_dir = setup_test_dir();

    for plan in ["1", "3"] {
        cli(temp_dir.path())
            .args(["start", plan, "--auto-complete"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:  2"))
        .stdout(predicate::str::contains("Weekly goal:     2/4 (50%)"))
        .stdout(predicate::str::contains("Current streak:  1 days"))
        .stdout(predicate::str::contains("★ First Workout"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    for _ in 0..2 {
        cli(temp_dir.path())
            .args(["start", "1", "--auto-complete"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 2 sessions to CSV"));

    let csv_content = fs::read_to_string(data_dir.join("sessions.csv")).expect("Failed to read CSV");
    assert!(csv_content.starts_with("session_id,plan_id,date"));
    // Header plus one row per exercise
    assert_eq!(csv_content.lines().count(), 1 + 2 * 3);

    assert!(!data_dir.join("sessions.wal").exists());
    assert!(data_dir.join("sessions.wal.processed").exists());

    // Archived sessions still count towards progress
    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:  2"));
}

#[test]
fn test_rollup_with_cleanup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .args(["start", "2", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["rollup", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned up 1 processed log files"));

    assert!(!data_dir.join("sessions.wal.processed").exists());
    assert!(data_dir.join("sessions.csv").exists());
}

#[test]
fn test_rollup_without_log() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_custom_library_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let library = serde_json::json!({
        "exercises": [
            {"id": 10, "name": "Kettlebell Swing", "muscle_groups": ["Glutes"], "equipment": ["Kettlebell"], "instructions": "Hinge and snap."}
        ],
        "plans": [
            {"id": 7, "name": "Swing Day", "description": "", "difficulty": "beginner", "duration_minutes": 10, "exercises": [10, 99]}
        ]
    });
    fs::write(data_dir.join("library.json"), library.to_string()).unwrap();

    // Exercise 99 does not resolve and is skipped
    cli(temp_dir.path())
        .args(["start", "7", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 exercises"));

    let sessions = wal_lines(temp_dir.path());
    assert_eq!(sessions[0]["exercises"].as_array().unwrap().len(), 1);
}

#[test]
fn test_plans_show_weekly_summary() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .success()
        .stdout(predicate::str::contains("This week: 0 workouts | Total: 0 min | Streak: 0 days"));

    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("plans")
        .assert()
        .success()
        .stdout(predicate::str::contains("This week: 1 workouts | Total: 0 min | Streak: 1 days"));
}

#[test]
fn test_session_shows_workout_overview() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout overview:"))
        .stdout(predicate::str::contains("▶ 1. Push-up"))
        .stdout(predicate::str::contains("✓ 1. Push-up"))
        .stdout(predicate::str::contains("▶ 2. Barbell Squat"));
}

#[test]
fn test_info_shows_form_tips() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "1"])
        .write_stdin("info\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Start in a high plank"))
        .stdout(predicate::str::contains("Form tips:"))
        .stdout(predicate::str::contains("• Keep your core engaged throughout the movement"));
}

#[test]
fn test_repeated_plan_entries_are_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let library = serde_json::json!({
        "exercises": [
            {"id": 1, "name": "Burpee", "muscle_groups": ["full body"], "equipment": [], "instructions": "Drop, jump."},
            {"id": 2, "name": "Jump Rope", "muscle_groups": ["calves"], "equipment": ["rope"], "instructions": "Skip."}
        ],
        "plans": [
            {"id": 1, "name": "Circuit", "description": "", "difficulty": "beginner", "duration_minutes": 15, "exercises": [1, 2, 1]}
        ]
    });
    fs::write(data_dir.join("library.json"), library.to_string()).unwrap();

    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 repeated exercises in this plan were merged"));
}

#[test]
fn test_profile_show_and_update() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: (not set)"))
        .stdout(predicate::str::contains("No goals set yet"));

    cli(temp_dir.path())
        .args(["profile", "--name", "Alex", "--goals", "Run 5k, Squat 100kg,"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile updated successfully!"));

    cli(temp_dir.path())
        .args(["profile", "--goals", "Run 10k"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: Alex"))
        .stdout(predicate::str::contains("• Run 10k"))
        .stdout(predicate::str::contains("Squat 100kg").not());

    let saved: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("data/profile.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["name"], "Alex");
}

#[test]
fn test_rollup_rerun_after_interrupted_retire() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(temp_dir.path())
        .args(["start", "1", "--auto-complete"])
        .assert()
        .success();
    cli(temp_dir.path()).arg("rollup").assert().success();

    // Archive written, log never renamed
    fs::rename(
        data_dir.join("sessions.wal.processed"),
        data_dir.join("sessions.wal"),
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 0 sessions to CSV"))
        .stdout(predicate::str::contains("1 sessions were already archived"));

    let csv_content = fs::read_to_string(data_dir.join("sessions.csv")).unwrap();
    assert_eq!(csv_content.lines().count(), 1 + 3);
}
