//! Integration tests for the heavyduty CLI.
//!
//! Every test runs against a fresh temp data directory with a pinned
//! `--today`, so schedules and streaks are deterministic.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("heavyduty").expect("Failed to find heavyduty binary");
    // Keep the user's real config file out of the tests
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn start(data_dir: &Path) {
    cli(data_dir)
        .args(["start", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Training starts on 2025-01-06"));
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Home workout progression planner and nutrition tracker",
        ));
}

#[test]
fn test_default_command_without_start_date() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No start date set"));
}

#[test]
fn test_start_then_today() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-01-06", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WEEK 1 · LEVEL 1"))
        .stdout(predicate::str::contains("chest_pushup"))
        .stdout(predicate::str::contains("Progress: 0/8"));
}

#[test]
fn test_today_before_start_date() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Training starts on 2025-01-06"));
}

#[test]
fn test_rest_day() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    // Tuesday of week 1 is a rest day
    cli(temp_dir.path())
        .args(["today", "--date", "2025-01-07"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rest day"));
}

#[test]
fn test_mark_is_persisted_and_idempotent() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["mark", "chest_pushup", "--date", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked chest_pushup on 2025-01-06"))
        .stdout(predicate::str::contains("Day progress:"));

    cli(temp_dir.path())
        .args(["mark", "chest_pushup", "--date", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already marked"));

    let progress: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join("progress.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(progress["start_date"], "2025-01-06");

    cli(temp_dir.path())
        .args(["--today", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Push-up"))
        .stdout(predicate::str::contains("Progress: 1/8"));

    cli(temp_dir.path())
        .args(["unmark", "chest_pushup", "--date", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unmarked chest_pushup"));
}

#[test]
fn test_mark_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["mark", "no_such_exercise", "--date", "2025-01-06"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_exercise"));
}

#[test]
fn test_mark_before_start_fails() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["mark", "chest_pushup", "--date", "2025-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDate"));
}

#[test]
fn test_week_view() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["week", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WEEK 5 · LEVEL 2 (Intermediate)"))
        .stdout(predicate::str::contains("generated plan"))
        .stdout(predicate::str::contains("Wed  rest"));

    cli(temp_dir.path())
        .args(["week", "17"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WEEK 17 · LEVEL 5 (Master 2)"));
}

#[test]
fn test_streak_and_reset() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-01-06", "streak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current streak: 0 days"));

    cli(temp_dir.path())
        .args(["mark", "chest_pushup", "--date", "2025-01-06"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["--today", "2025-01-06", "reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress reset"));

    cli(temp_dir.path())
        .args(["--today", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress: 0/8"));
}

#[test]
fn test_reset_aborts_without_confirmation() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-01-06", "reset"])
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));
}

#[test]
fn test_calendar() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-01-08", "calendar", "--month", "2025-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01"))
        .stdout(predicate::str::contains("Mon   Tue"));

    cli(temp_dir.path())
        .args(["calendar", "--month", "2025-13"])
        .assert()
        .failure();
}

#[test]
fn test_library_filters() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["library", "--category", "forearms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("forearms_wrist_curl"))
        .stdout(predicate::str::contains("2 exercises"));

    cli(temp_dir.path())
        .args(["library", "--category", "nonsense"])
        .assert()
        .failure();
}

#[test]
fn test_stats_lists_workouts_per_month() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["--today", "2025-02-03", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed workouts: 0"))
        .stdout(predicate::str::contains("2025-01    0"))
        .stdout(predicate::str::contains("2025-02    0"));
}

#[test]
fn test_show_and_video() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["video", "chest_pushup", "https://youtu.be/IODxDxX7oi4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved video"));
    assert!(temp_dir.path().join("plan.json").exists());

    cli(temp_dir.path())
        .args(["show", "chest_pushup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://youtu.be/IODxDxX7oi4"));

    cli(temp_dir.path())
        .args(["video", "chest_pushup", "https://example.com/clip"])
        .assert()
        .failure();
}

#[test]
fn test_profile_and_meals() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["profile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Targets unavailable: weight_kg is required"));

    cli(temp_dir.path())
        .args([
            "profile", "set", "--weight", "80", "--height", "180", "--age", "30", "--sex",
            "male",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMR:      1780 kcal"));

    cli(temp_dir.path())
        .args([
            "meal", "add", "Oats", "--calories", "400", "--protein", "20", "--carbs", "60",
            "--fat", "8", "--time", "07:30", "--date", "2025-01-06",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged Oats (400 kcal)"));

    cli(temp_dir.path())
        .args(["meal", "list", "--date", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("07:30 Oats"))
        .stdout(predicate::str::contains("vs target"));

    cli(temp_dir.path())
        .args(["meal", "remove", "2", "--date", "2025-01-06"])
        .assert()
        .failure();

    cli(temp_dir.path())
        .args(["meal", "remove", "1", "--date", "2025-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed Oats"));
}

#[test]
fn test_export() {
    let temp_dir = setup_test_dir();
    start(temp_dir.path());

    cli(temp_dir.path())
        .args(["mark", "chest_pushup", "--date", "2025-01-06"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["--today", "2025-01-12", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 training days"));

    let history = std::fs::read_to_string(temp_dir.path().join("exports/history.csv")).unwrap();
    assert!(history.starts_with("date,week,level,planned,completed,ratio,complete"));
    assert!(temp_dir.path().join("exports/meals.csv").exists());
}
