#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ackd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ackd").unwrap();
    cmd.current_dir(dir.path())
        .env("ACKD_CONFIG", dir.path().join("config.yaml"));
    cmd
}

// ---------------------------------------------------------------------------
// ackd init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_template() {
    let dir = TempDir::new().unwrap();
    ackd(&dir).arg("init").assert().success();

    let config = std::fs::read_to_string(dir.path().join("config.yaml")).unwrap();
    assert!(config.contains("api_key"));
    assert!(config.contains("poll_interval_secs"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    ackd(&dir).arg("init").assert().success();
    ackd(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ---------------------------------------------------------------------------
// Config validation
// ---------------------------------------------------------------------------

#[test]
fn incidents_without_config_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    ackd(&dir)
        .arg("incidents")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn sweep_rejects_empty_api_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "api_key: \"\"\n").unwrap();
    ackd(&dir)
        .arg("sweep")
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn run_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "api_key: [1, 2]\n").unwrap();
    ackd(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"))
        // The yaml parse error rides along as the error source.
        .stderr(predicate::str::contains("invalid type"));
}
