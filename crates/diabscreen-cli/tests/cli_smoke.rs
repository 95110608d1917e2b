//! CLI binary smoke tests using assert_cmd.
//!
//! These run the compiled `diabscreen` binary against a small logistic model
//! written to a temp directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

use diabscreen::schema::FEATURE_NAMES;

fn cmd() -> Command {
    Command::cargo_bin("diabscreen").unwrap()
}

/// p = sigmoid(0.1 * (BMI - 25))
fn model_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    dir
}

fn write_model(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let coefficients: Vec<serde_json::Value> = FEATURE_NAMES
        .iter()
        .map(|name| {
            let weight = if *name == "BMI" { 0.1 } else { 0.0 };
            serde_json::json!({ "feature": name, "weight": weight })
        })
        .collect();
    fs::write(
        dir.join("logistic.json"),
        serde_json::json!({ "intercept": -2.5, "coefficients": coefficients }).to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("manifest.json"),
        r#"{"name": "smoke-logistic", "backend": "logistic"}"#,
    )
    .unwrap();
}

fn screen_args(dir: &Path) -> Vec<String> {
    [
        "screen", "--highbp", "yes", "--highchol", "yes", "--smoker", "no",
        "--phys-activity", "yes", "--genhlth", "4", "--age", "8", "--model-dir",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(dir.display().to_string()))
    .collect()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("screen"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("diabscreen"));
}

// ---------------------------------------------------------------------------
// bmi / schema
// ---------------------------------------------------------------------------

#[test]
fn bmi_prints_one_decimal() {
    cmd()
        .args(["bmi", "--height-cm", "170", "--weight-kg", "70"])
        .assert()
        .success()
        .stdout(predicate::str::diff("24.2\n"));
}

#[test]
fn bmi_below_screening_range_still_prints() {
    cmd()
        .args(["bmi", "--height-cm", "250", "--weight-kg", "30"])
        .assert()
        .success()
        .stdout(predicate::str::diff("4.8\n"));
}

#[test]
fn bmi_rejects_implausible_height() {
    cmd()
        .args(["bmi", "--height-cm", "17", "--weight-kg", "70"])
        .assert()
        .failure();
}

#[test]
fn schema_prints_feature_names() {
    cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("brfss-diabetes-21/v1"))
        .stdout(predicate::str::contains("HeartDiseaseorAttack"));
}

#[test]
fn schema_check_accepts_matching_model() {
    let dir = model_dir();
    cmd()
        .args(["schema", "--check"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("smoke-logistic"));
}

// ---------------------------------------------------------------------------
// screen
// ---------------------------------------------------------------------------

#[test]
fn screen_prints_outcome_json() {
    let dir = model_dir();
    let mut args = screen_args(dir.path());
    args.extend(["--bmi".to_string(), "30".to_string()]);

    cmd()
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"high risk\""))
        .stdout(predicate::str::contains("\"model\": \"smoke-logistic\""));
}

#[test]
fn screen_writes_report() {
    let dir = model_dir();
    let report = dir.path().join("out").join("report.html");
    let mut args = screen_args(dir.path());
    args.extend([
        "--height-cm".to_string(),
        "170".to_string(),
        "--weight-kg".to_string(),
        "70".to_string(),
        "--report".to_string(),
        report.display().to_string(),
    ]);

    cmd().args(&args).assert().success();
    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("Your risk is low"));
    assert!(html.contains("risk-distribution"));
}

#[test]
fn screen_rejects_out_of_range_age() {
    let dir = model_dir();
    let mut args = screen_args(dir.path());
    args.extend(["--bmi".to_string(), "30".to_string()]);
    let age = args.iter().position(|a| a == "8").unwrap();
    args[age] = "14".to_string();

    cmd().args(&args).assert().failure();
}

#[test]
fn screen_uses_default_model_dir() {
    let cwd = tempfile::tempdir().unwrap();
    write_model(&cwd.path().join("models").join("diabetes"));

    cmd()
        .current_dir(cwd.path())
        .args([
            "screen", "--highbp", "yes", "--highchol", "yes", "--smoker", "no",
            "--phys-activity", "yes", "--genhlth", "4", "--age", "8", "--bmi", "30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"smoke-logistic\""));
}

#[test]
fn screen_with_missing_model_fails() {
    let mut args = screen_args(Path::new("/nonexistent/model"));
    args.extend(["--bmi".to_string(), "30".to_string()]);
    cmd().args(&args).assert().failure();
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

#[test]
fn batch_scores_csv() {
    let dir = model_dir();
    let input = dir.path().join("people.csv");
    let output = dir.path().join("scored.csv");
    fs::write(
        &input,
        "highbp,highchol,bmi,smoker,phys_activity,genhlth,age\n\
         Yes,Yes,45.0,No,Yes,4,8\n\
         No,No,20.0,No,Yes,1,3\n",
    )
    .unwrap();

    cmd()
        .args(["batch"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--model-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Screened 2 rows"));

    let scored = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = scored.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("high risk"));
    assert!(lines[2].contains("low risk"));
}

#[test]
fn batch_rejects_non_csv_input() {
    let dir = model_dir();
    let input = dir.path().join("people.txt");
    fs::write(&input, "").unwrap();
    cmd()
        .arg("batch")
        .arg(&input)
        .arg("--model-dir")
        .arg(dir.path())
        .assert()
        .failure();
}
