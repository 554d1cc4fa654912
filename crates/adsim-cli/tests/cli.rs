use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

fn minimal_spec() -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    fs::write(
        file.path(),
        "scenarios:\n  - scenario_id: monopoly\n    overrides:\n      daily_baseline: 50\n",
    )
    .unwrap();
    file
}

#[test]
fn validate_reports_success_for_a_clean_spec() {
    let spec = minimal_spec();
    Command::cargo_bin("adsim")
        .unwrap()
        .args(["validate", "--spec"])
        .arg(spec.path())
        .assert()
        .success()
        .stdout(contains("0 error"));
}

#[test]
fn validate_fails_for_missing_file() {
    Command::cargo_bin("adsim")
        .unwrap()
        .args(["validate", "--spec", "does/not/exist.yaml"])
        .assert()
        .failure();
}

#[test]
fn run_simulates_named_scenario_and_records_a_manifest() {
    let spec = minimal_spec();
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("result.json");

    Command::cargo_bin("adsim")
        .unwrap()
        .args(["run", "--spec"])
        .arg(spec.path())
        .args(["--scenario", "monopoly", "--days", "2", "--seed", "7", "--out"])
        .arg(&out_path)
        .assert()
        .success()
        .stdout(contains("Ran 2 day(s)"));

    assert!(out_path.exists());
    let manifests: Vec<_> = fs::read_dir(out_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("run-"))
        .collect();
    assert_eq!(manifests.len(), 1);
}

#[test]
fn run_rejects_unknown_scenario_id() {
    let spec = minimal_spec();
    Command::cargo_bin("adsim")
        .unwrap()
        .args(["run", "--spec"])
        .arg(spec.path())
        .args(["--scenario", "does-not-exist"])
        .assert()
        .failure();
}
