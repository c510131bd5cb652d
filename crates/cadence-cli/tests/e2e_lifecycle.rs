//! E2E lifecycle tests: add -> record -> show -> edit -> delete.
//!
//! Each test runs `cad` as a subprocess against an isolated temp data dir,
//! so every invocation also exercises persistence across process restarts.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the cad binary, homed in `dir`.
fn cad_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cad"));
    cmd.env("CADENCE_HOME", dir);
    // Suppress tracing output that goes to stderr
    cmd.env("CADENCE_LOG", "error");
    cmd
}

/// Create a tracker via CLI, return its id.
fn add_tracker(dir: &Path, name: &str) -> u64 {
    let output = cad_cmd(dir)
        .args(["add", name, "--json"])
        .output()
        .expect("add should not crash");
    assert!(
        output.status.success(),
        "add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("add --json should produce valid JSON");
    json["id"].as_u64().expect("add output should have 'id'")
}

/// Run `cad show <id> --json` and return the parsed JSON.
fn show_json(dir: &Path, id: u64) -> Value {
    let output = cad_cmd(dir)
        .args(["show", &id.to_string(), "--json"])
        .output()
        .expect("show should not crash");
    assert!(
        output.status.success(),
        "show {id} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn add_then_show_roundtrips_across_processes() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "water plants");

    let json = show_json(dir.path(), id);
    assert_eq!(json["name"], "water plants");
    assert_eq!(json["completions"], 0);
    assert!(json["forecast"].is_null());
}

#[test]
fn recording_builds_a_forecast() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "brush teeth");

    for entry in ["2025-03-01 8:00", "2025-03-02 8:00", "2025-03-03 8:00"] {
        cad_cmd(dir.path())
            .args(["record", &id.to_string(), entry])
            .assert()
            .success();
    }

    let json = show_json(dir.path(), id);
    assert_eq!(json["completions"], 3);
    assert_eq!(json["average"], 86_400, "average interval in seconds");
    assert_eq!(json["spread"], 0);
    assert_eq!(json["forecast"], "2025-03-04 08:00:00");
    // Zero spread collapses the window onto the forecast.
    assert_eq!(json["early"], json["forecast"]);
    assert_eq!(json["late"], json["forecast"]);
}

#[test]
fn adjustment_bends_the_closed_interval() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "vitamins");

    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "2025-03-01 8:00"])
        .assert()
        .success();
    // The -2h adjustment shortens the interval this completion closes.
    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "2025-03-02 8:00, -2h"])
        .assert()
        .success();

    let json = show_json(dir.path(), id);
    assert_eq!(json["average"], 22 * 3600);
}

#[test]
fn set_history_replaces_and_history_rm_removes() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "laundry");

    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "2025-01-01 9:00"])
        .assert()
        .success();
    cad_cmd(dir.path())
        .args([
            "set-history",
            &id.to_string(),
            "2025-03-01 8:00; 2025-03-08 8:00; 2025-03-15 8:00",
        ])
        .assert()
        .success();

    let json = show_json(dir.path(), id);
    assert_eq!(json["completions"], 3, "old history was replaced");
    assert_eq!(json["average"], 7 * 86_400);

    cad_cmd(dir.path())
        .args(["history-rm", &id.to_string(), "0"])
        .assert()
        .success();
    assert_eq!(show_json(dir.path(), id)["completions"], 2);

    // Out-of-range index fails and changes nothing.
    cad_cmd(dir.path())
        .args(["history-rm", &id.to_string(), "9"])
        .assert()
        .failure();
    assert_eq!(show_json(dir.path(), id)["completions"], 2);
}

#[test]
fn history_set_replaces_one_entry() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "stretch");

    cad_cmd(dir.path())
        .args([
            "set-history",
            &id.to_string(),
            "2025-03-01 8:00; 2025-03-02 8:00",
        ])
        .assert()
        .success();
    cad_cmd(dir.path())
        .args(["history-set", &id.to_string(), "1", "2025-03-02 20:00"])
        .assert()
        .success();

    let json = show_json(dir.path(), id);
    assert_eq!(json["average"], 36 * 3600);
}

#[test]
fn rename_persists() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "old name");

    cad_cmd(dir.path())
        .args(["rename", &id.to_string(), "new name"])
        .assert()
        .success();
    assert_eq!(show_json(dir.path(), id)["name"], "new name");
}

#[test]
fn delete_is_idempotent_but_show_fails_after() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "ephemeral");

    cad_cmd(dir.path())
        .args(["delete", &id.to_string()])
        .assert()
        .success();
    // Deleting again is a no-op, not an error.
    cad_cmd(dir.path())
        .args(["delete", &id.to_string()])
        .assert()
        .success();

    cad_cmd(dir.path())
        .args(["show", &id.to_string()])
        .assert()
        .failure();
}

#[test]
fn unknown_tracker_reports_a_stable_error_code() {
    let dir = TempDir::new().unwrap();

    let output = cad_cmd(dir.path())
        .args(["record", "42", "now", "--json"])
        .output()
        .expect("record should not crash");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("error JSON on stderr");
    assert_eq!(json["error"]["error_code"], "E2001");
    assert!(json["error"]["suggestion"].is_string());
}

#[test]
fn malformed_entry_is_rejected_with_a_reason() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "teeth");

    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "whenever"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("whenever"));
    assert_eq!(show_json(dir.path(), id)["completions"], 0);
}

#[test]
fn oversized_adjustment_fails_cleanly_and_store_stays_usable() {
    let dir = TempDir::new().unwrap();
    let id = add_tracker(dir.path(), "teeth");

    // Past the representable duration range: a format error, not an abort,
    // and the store is still closed cleanly on the failure path.
    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "now, 99999999999999d"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("out of range"));

    // An in-range but astronomically large adjustment records fine.
    cad_cmd(dir.path())
        .args(["record", &id.to_string(), "2025-01-02 8:00, 10000000000d"])
        .assert()
        .success();
    assert_eq!(show_json(dir.path(), id)["completions"], 1);
}

#[test]
fn settings_set_show_and_reset() {
    let dir = TempDir::new().unwrap();

    cad_cmd(dir.path())
        .args(["settings", "set", "eta", "3"])
        .assert()
        .success();

    let output = cad_cmd(dir.path())
        .args(["settings", "show", "--json"])
        .output()
        .expect("settings show");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["eta"], 3);
    assert_eq!(json["ampm"], true);

    // The η alias reaches the same key.
    cad_cmd(dir.path())
        .args(["settings", "set", "η", "5"])
        .assert()
        .success();

    cad_cmd(dir.path())
        .args(["settings", "reset"])
        .assert()
        .success();
    let output = cad_cmd(dir.path())
        .args(["settings", "show", "--json"])
        .output()
        .expect("settings show");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["eta"], 2);

    cad_cmd(dir.path())
        .args(["settings", "set", "sigma", "1"])
        .assert()
        .failure();
}
