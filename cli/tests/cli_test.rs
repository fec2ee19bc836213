use assert_cmd::Command;
use predicates::prelude::*;

fn vsum() -> Command {
    let mut cmd = Command::cargo_bin("vsum").expect("vsum binary");
    cmd.env("VSUM_TRACE", "0");
    cmd
}

#[test]
fn test_list_scenarios() {
    vsum()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("few_long"))
        .stdout(predicate::str::contains("Too small for parallelism"));
}

#[test]
fn test_tiny_scenario_table() {
    let assert = vsum()
        .args(["--scenario", "tiny", "--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vector-level Parallelism"))
        .stdout(predicate::str::contains("Too small for parallelism"));

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(!stdout.contains("!!!"), "every strategy should validate:\n{}", stdout);
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn test_scaled_run_as_json() {
    let assert = vsum()
        .args(["--scale", "0.0005", "--threads", "2", "--format", "json"])
        .assert()
        .success();

    let stdout = &assert.get_output().stdout;
    let report: serde_json::Value = serde_json::from_slice(stdout).expect("valid json");
    assert_eq!(report["threads"], 2);
    let rows = report["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 4);
    for row in rows {
        for key in ["sequential", "per_vector", "shuffle", "dynamic", "static"] {
            assert!(
                row["results"][key].is_u64(),
                "{} invalid in {}",
                key,
                row["scenario"]
            );
        }
    }
}

#[test]
fn test_unknown_scenario_fails() {
    vsum()
        .args(["--scenario", "galactic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario 'galactic'"));
}

#[test]
fn test_invalid_scale_rejected() {
    vsum()
        .args(["--scale", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scale must be in (0, 1]"));
}
