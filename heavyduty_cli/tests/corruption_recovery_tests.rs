//! Corruption recovery tests for the heavyduty CLI.
//!
//! These tests verify the system can handle:
//! - Corrupted progress and nutrition documents (moved aside, with a warning)
//! - Corrupted plan documents (hard error, nothing overwritten)
//! - Invalid configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("heavyduty").expect("Failed to find heavyduty binary");
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

#[test]
fn test_corrupted_progress_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("progress.json"), "{ invalid json }}}}").unwrap();

    cli(data_dir)
        .args(["start", "2025-01-06"])
        .assert()
        .success()
        .stderr(predicate::str::contains("progress document"));

    // The unreadable file is kept for inspection
    assert_eq!(
        fs::read_to_string(data_dir.join("progress.json.corrupt")).unwrap(),
        "{ invalid json }}}}"
    );

    // The fresh document was saved, so the next run is quiet
    cli(data_dir)
        .args(["--today", "2025-01-06"])
        .assert()
        .success()
        .stderr(predicate::str::contains("progress document").not())
        .stdout(predicate::str::contains("WEEK 1"));
}

#[test]
fn test_corrupted_nutrition_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("nutrition.json"), "[1, 2").unwrap();

    cli(data_dir)
        .args(["meal", "list", "--date", "2025-01-06"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nutrition document"))
        .stdout(predicate::str::contains("No meals logged"));
}

#[test]
fn test_corrupted_plan_file_is_fatal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let plan_path = data_dir.join("plan.json");
    fs::write(&plan_path, "not a plan").unwrap();

    cli(data_dir)
        .arg("library")
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan document"));

    assert_eq!(fs::read_to_string(&plan_path).unwrap(), "not a plan");
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let config_dir = data_dir.join("config/heavyduty");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[progression]\ncompletion_threshold = 1.5\n",
    )
    .unwrap();

    cli(data_dir)
        .arg("streak")
        .assert()
        .failure()
        .stderr(predicate::str::contains("completion_threshold"));
}
