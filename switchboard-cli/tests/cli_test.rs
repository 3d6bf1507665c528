//! Integration tests for the switchboard binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn switchboard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("switchboard").unwrap();
    cmd.arg("--no-color")
        .arg("--store")
        .arg(dir.path().join("flags.json"))
        .env_remove("SWITCHBOARD_FEATURES")
        .env_remove("SWITCHBOARD_KEY")
        .env_remove("SWITCHBOARD_FALLBACK_KEY")
        .env_remove("SWITCHBOARD_DEGRADED_PREFIX")
        .env_remove("SWITCHBOARD_CONFIG")
        .env_remove("SWITCHBOARD_STORE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_get_unset_flag() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir)
        .args(["get", "beta"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_enable_then_get() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir).args(["enable", "beta"]).assert().success();
    switchboard(&dir)
        .args(["get", "beta"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn test_set_variant_persists_encoded() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir)
        .args(["set", "theme", "dark"])
        .assert()
        .success();

    switchboard(&dir)
        .arg("raw")
        .assert()
        .success()
        .stdout("*dark|theme\n");

    let content = std::fs::read_to_string(dir.path().join("flags.json")).unwrap();
    assert!(content.contains("dark|theme"));
}

#[test]
fn test_fallback_from_env() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir)
        .env("SWITCHBOARD_FEATURES", "beta,gamma")
        .args(["get", "gamma"])
        .assert()
        .success()
        .stdout("true\n");

    switchboard(&dir)
        .env("SWITCHBOARD_FEATURES", "beta,gamma")
        .args(["get", "gamma", "--ignore-fallback"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_get_json_reports_source() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir).args(["disable", "beta"]).assert().success();

    switchboard(&dir)
        .env("SWITCHBOARD_FEATURES", "beta")
        .args(["--json", "get", "beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\":\"override\""))
        .stdout(predicate::str::contains("\"value\":false"));
}

#[test]
fn test_remove_and_reset() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir).args(["enable", "a"]).assert().success();
    switchboard(&dir).args(["enable", "b"]).assert().success();

    switchboard(&dir)
        .args(["remove", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed override for a"));

    switchboard(&dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 override(s)"));

    switchboard(&dir)
        .args(["get", "b"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir).args(["enable", "beta"]).assert().success();

    switchboard(&dir)
        .env("SWITCHBOARD_FEATURES", "gamma")
        .args(["--json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"beta\": true"))
        .stdout(predicate::str::contains("\"gamma\""));
}

#[test]
fn test_custom_key() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir)
        .args(["--key", "flags", "enable", "beta"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("flags.json")).unwrap();
    assert!(content.contains("\"flags\""));

    switchboard(&dir)
        .args(["get", "beta"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_rejects_reserved_name() {
    let dir = TempDir::new().unwrap();
    switchboard(&dir)
        .args(["enable", "a|b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
