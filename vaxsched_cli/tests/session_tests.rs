//! Staff session tests for vaxsched.
//!
//! These tests verify that staff-only commands:
//! - Refuse to run without a session
//! - Treat a corrupted session file as logged out
//! - Enforce the Reader role restriction
//! - Stop before the network when no backend is configured

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(temp_dir: &TempDir) -> Command {
    let config_path = temp_dir.path().join("config.toml");
    if !config_path.exists() {
        fs::write(&config_path, "").expect("Failed to write config");
    }

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vaxsched"));
    cmd.env_remove("VAXSCHED_BASE_URL")
        .arg("--config")
        .arg(&config_path)
        .arg("--data-dir")
        .arg(temp_dir.path());
    cmd
}

fn write_session(temp_dir: &TempDir, role: &str) {
    let session = serde_json::json!({ "token": "tok-1", "role": role, "name": "Nurse Malee" });
    fs::write(temp_dir.path().join("session.json"), session.to_string())
        .expect("Failed to write session");
}

#[test]
fn test_whoami_without_session() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn test_whoami_with_session() {
    let temp_dir = setup_test_dir();
    write_session(&temp_dir, "Admin");

    cli(&temp_dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nurse Malee (Admin)"));
}

#[test]
fn test_corrupted_session_is_logged_out() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("session.json"), "{ invalid json }}}}").unwrap();

    cli(&temp_dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));

    cli(&temp_dir)
        .args(["search", "somchai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_search_requires_login() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["search", "0812345678"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vaxsched login"));
}

#[test]
fn test_assign_requires_login() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["assign", "--line-user-id", "U1", "--vaccine", "hpv", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_reader_cannot_assign() {
    let temp_dir = setup_test_dir();
    write_session(&temp_dir, "Reader");

    cli(&temp_dir)
        .args(["assign", "--line-user-id", "U1", "--vaccine", "hpv", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("role 'Reader' cannot create dose schedules"));
}

#[test]
fn test_staff_assign_dry_run() {
    let temp_dir = setup_test_dir();
    write_session(&temp_dir, "Staff");

    cli(&temp_dir)
        .args([
            "assign",
            "--line-user-id",
            "U1",
            "--vaccine",
            "tetanus",
            "--first-dose-date",
            "2024-01-20",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-08-03"))
        .stdout(predicate::str::contains(r#""lineUserId": "U1""#))
        .stdout(predicate::str::contains(r#""firstDoseDate": "2024-01-20""#));
}

#[test]
fn test_search_without_backend_fails_cleanly() {
    let temp_dir = setup_test_dir();
    write_session(&temp_dir, "Reader");

    cli(&temp_dir)
        .args(["search", "somchai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url is not set"));
}

#[test]
fn test_login_without_backend_leaves_no_session() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["login", "--staff-id", "S01", "--password", "pw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url is not set"));

    assert!(!temp_dir.path().join("session.json").exists());
}

#[test]
fn test_logout_removes_session() {
    let temp_dir = setup_test_dir();
    write_session(&temp_dir, "Staff");

    cli(&temp_dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
    assert!(!temp_dir.path().join("session.json").exists());

    cli(&temp_dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session."));
}

#[test]
fn test_login_help_warns_password_is_echoed() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echoes what you type"));
}

#[test]
fn test_login_prompt_reads_password_from_stdin() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["login", "--staff-id", "S01"])
        .write_stdin("pw\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Password (input is visible): "))
        .stderr(predicate::str::contains("base_url is not set"));
}
