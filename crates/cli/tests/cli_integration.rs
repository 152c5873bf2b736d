//! CLI integration tests for the `check` and `parse` subcommands.
//!
//! Uses `assert_cmd` to spawn the `shep` binary and verify exit codes,
//! stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to conformance fixtures resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `shep` binary, rooted at workspace.
fn shep() -> Command {
    let mut cmd = cargo_bin_cmd!("shep");
    cmd.current_dir(workspace_root());
    cmd.env_remove("SHEP_LOG");
    cmd
}

/// Write `src` as `app.shep` (and optionally a `shep.toml`) into a temp dir.
fn project(src: &str, config: Option<&str>) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("app.shep");
    fs::write(&file, src).unwrap();
    if let Some(config) = config {
        fs::write(dir.path().join("shep.toml"), config).unwrap();
    }
    (dir, file)
}

const WARNING_ONLY: &str = "app \"T\"\nentity Ticket\n";

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    shep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shep specification checker"));
}

#[test]
fn version_exits_0() {
    shep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shep"));
}

// ──────────────────────────────────────────────
// 2. check
// ──────────────────────────────────────────────

#[test]
fn check_valid_file_exits_0() {
    shep()
        .args(["check", "conformance/positive/support_desk.shep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("support_desk.shep: ok (0 errors"))
        .stdout(predicate::str::contains("3 entities, 5 screens"));
}

#[test]
fn check_reports_errors_with_codes_and_exits_1() {
    shep()
        .args(["check", "conformance/negative/unknown_relationship_target.shep"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("error[field.unknown-entity]"))
        .stdout(predicate::str::contains("unknown_relationship_target.shep:6"))
        .stdout(predicate::str::contains("'Ghost'"));
}

#[test]
fn check_json_output_is_verification_result() {
    let output = shep()
        .args([
            "check",
            "conformance/negative/wizard_without_steps.shep",
            "--output",
            "json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error_count"], 1);
    assert!(json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["code"] == "screen.wizard-no-steps" && i["severity"] == "error"));
    assert_eq!(json["summary"]["screens"], 1);
}

#[test]
fn check_parse_failure_exits_1_on_stderr() {
    shep()
        .args(["check", "conformance/parse_errors/missing_app_header.shep"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("parse error:"))
        .stderr(predicate::str::contains("missing_app_header.shep:2"));
}

#[test]
fn check_parse_failure_json_lists_all_errors() {
    let output = shep()
        .args([
            "--output",
            "json",
            "check",
            "conformance/parse_errors/recovers_after_errors.shep",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["errors"].as_array().unwrap().len(), 3);
}

#[test]
fn check_missing_file_exits_1() {
    shep()
        .args(["check", "does/not/exist.shep"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn check_quiet_prints_nothing() {
    shep()
        .args(["check", "--quiet", "conformance/negative/duplicate_field.shep"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn warnings_pass_unless_strict() {
    let (_dir, file) = project(WARNING_ONLY, None);
    shep()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("warning[entity.no-fields]"));
    shep()
        .args(["check", "--strict"])
        .arg(&file)
        .assert()
        .failure()
        .code(1);
}

// ──────────────────────────────────────────────
// 3. shep.toml
// ──────────────────────────────────────────────

#[test]
fn config_strict_and_output_apply() {
    let (_dir, file) = project(WARNING_ONLY, Some("strict = true\noutput = \"json\"\n"));
    let output = shep().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["warning_count"], 1);
}

#[test]
fn flag_overrides_config_output() {
    let (_dir, file) = project(WARNING_ONLY, Some("output = \"json\"\n"));
    shep()
        .args(["check", "--output", "text"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("app.shep: ok"));
}

#[test]
fn config_ignore_hides_warnings_but_not_errors() {
    let (_dir, file) = project(
        WARNING_ONLY,
        Some("strict = true\nignore = [\"entity.no-fields\"]\n"),
    );
    shep()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("entity.no-fields").not());

    let (_dir, file) = project(
        "app \"T\"\nentity User\n  name: text\n  name: text\n",
        Some("ignore = [\"sym.duplicate-field\"]\n"),
    );
    shep()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error[sym.duplicate-field]"));
}

#[test]
fn invalid_config_exits_1() {
    let (_dir, file) = project(WARNING_ONLY, Some("strict = maybe\n"));
    shep()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}

// ──────────────────────────────────────────────
// 4. parse
// ──────────────────────────────────────────────

#[test]
fn parse_prints_ast_json() {
    let output = shep()
        .args(["parse", "conformance/positive/support_desk.shep"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["spec"]["app_name"], "Support Desk");
    assert_eq!(json["spec"]["entities"][0]["name"], "Ticket");
    assert_eq!(
        json["spec"]["entities"][0]["fields"][4]["field_type"]["kind"],
        "relationship"
    );
    assert!(json["errors"].as_array().unwrap().is_empty());
}

#[test]
fn parse_failure_prints_errors_and_exits_1() {
    let output = shep()
        .args(["parse", "conformance/parse_errors/recovers_after_errors.shep"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("spec").is_none());
    assert_eq!(json["errors"].as_array().unwrap().len(), 3);
}

#[test]
fn parse_quiet_prints_nothing_but_keeps_exit_code() {
    shep()
        .args([
            "parse",
            "--quiet",
            "conformance/parse_errors/recovers_after_errors.shep",
        ])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty());
}
